//! The fixed seven-step program.
//!
//! Steps 1-3 are playable and carry a short exercise ("tool") with three
//! required free-text fields. Steps 4-7 are permanently locked in this build
//! and only point at the paid eBook.

use indoc::indoc;
use serde::Serialize;

use crate::error::ValidationError;
use crate::progress::ToolAnswers;

pub const STEP_COUNT: u32 = 7;

/// Where locked content is sold.
pub const EBOOK_URL: &str = "https://go.hotmart.com/W102844514P?dp=1";

/// Shown when a locked step is opened from the dashboard.
pub const LOCKED_STEP_NOTICE: &str =
    "Apenas o Protocolo Completo (no eBook) desbloqueia os dias 4-7 e o Manual Secreto de 15 Técnicas.";

/// Shown after finishing the last playable step.
pub const PAYWALL_NOTICE: &str = indoc! {"
    Você completou os 3 primeiros dias e provou que o método funciona!

    Mas os próximos 4 dias contêm as técnicas MAIS PODEROSAS:

    • O Manual Secreto de 15 Técnicas
    • Sistema de Reforço Neural
    • Blindagem Anti-Recaída
    • O Protocolo de Manutenção Vitalício

    Apenas o Protocolo Completo (no eBook) libera tudo."};

/// One input of a step's exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolField {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
}

/// Text and exercise of a playable step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepContent {
    pub teaser: &'static str,
    pub risk: &'static str,
    pub tool_title: &'static str,
    pub tool_description: &'static str,
    pub fields: &'static [ToolField],
    /// Finishing this step leads straight to the paywall notice.
    pub ends_free_tier: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub index: u32,
    pub title: &'static str,
    pub icon: &'static str,
    pub points: u32,
    pub locked: bool,
    pub content: Option<StepContent>,
}

impl StepDefinition {
    /// Keys of the fields that must be filled before completing the step.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.content
            .map(|c| c.fields)
            .unwrap_or_default()
            .iter()
            .map(|f| f.key)
    }

    /// Check that every required field has non-blank text.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingAnswers`] naming the blank fields.
    pub fn validate_answers(&self, answers: &ToolAnswers) -> Result<(), ValidationError> {
        let missing: Vec<String> = self
            .required_fields()
            .filter(|key| answers.get(*key).map_or(true, |v| v.trim().is_empty()))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingAnswers {
                step: self.index,
                missing,
            })
        }
    }
}

const fn locked(index: u32) -> StepDefinition {
    StepDefinition {
        index,
        title: "BLOQUEADO",
        icon: "lock-closed",
        points: 0,
        locked: true,
        content: None,
    }
}

pub static STEPS: [StepDefinition; STEP_COUNT as usize] = [
    StepDefinition {
        index: 1,
        title: "Identificação do Gatilho Secreto",
        icon: "eye",
        points: 100,
        locked: false,
        content: Some(StepContent {
            teaser: "Todo vício tem um GATILHO invisível. Não é o vício em si que te domina, mas sim o momento ANTES dele acontecer. Neste passo crucial, você vai mapear com precisão cirúrgica o que desencadeia sua falta de disciplina.",
            risk: "Sem identificar o gatilho, você lutará contra o sintoma, não a causa. É por isso que 97% das pessoas falham.",
            tool_title: "Analisador de Gatilhos",
            tool_description: "Preencha abaixo para descobrir o padrão oculto:",
            fields: &[
                ToolField {
                    key: "momento",
                    label: "Quando acontece? (hora, situação)",
                    placeholder: "Ex: Todo dia às 20h, quando estou sozinho",
                },
                ToolField {
                    key: "emocao",
                    label: "O que você sente ANTES?",
                    placeholder: "Ex: Ansiedade, tédio, frustração",
                },
                ToolField {
                    key: "ambiente",
                    label: "Onde você está?",
                    placeholder: "Ex: No quarto, no sofá, na rua",
                },
            ],
            ends_free_tier: false,
        }),
    },
    StepDefinition {
        index: 2,
        title: "A Regra dos 5 Segundos",
        icon: "timer",
        points: 150,
        locked: false,
        content: Some(StepContent {
            teaser: "Existe uma janela de 5 segundos entre o gatilho e a ação. Esta técnica neurocientífica interrompe o ciclo automático do cérebro, dando a VOCÊ o controle de volta.",
            risk: "A maioria das pessoas espera \"sentir vontade\" de mudar. Isso NUNCA acontece. Você precisa AGIR antes que seu cérebro te sabote.",
            tool_title: "Contador de Interrupções",
            tool_description: "Registre cada vez que você INTERROMPEU um impulso:",
            fields: &[
                ToolField {
                    key: "situacao",
                    label: "Descreva o impulso que sentiu",
                    placeholder: "Ex: Vontade de abrir Instagram",
                },
                ToolField {
                    key: "acao_alternativa",
                    label: "O que você FEZ no lugar?",
                    placeholder: "Ex: Respirei fundo 3x, bebi água",
                },
                ToolField {
                    key: "tempo_resistencia",
                    label: "Por quanto tempo resistiu?",
                    placeholder: "Ex: 30 minutos",
                },
            ],
            ends_free_tier: false,
        }),
    },
    StepDefinition {
        index: 3,
        title: "Substituição Estratégica",
        icon: "swap-horizontal",
        points: 200,
        locked: false,
        content: Some(StepContent {
            teaser: "Você não pode simplesmente \"parar\" um vício. A neurociência mostra que você precisa SUBSTITUIR o comportamento por algo que ative os mesmos receptores de dopamina, mas de forma saudável.",
            risk: "Tentar eliminar sem substituir é o erro fatal. Seu cérebro EXIGIRÁ a dopamina de volta, e você recairá em 72 horas.",
            tool_title: "Mapeador de Alternativas",
            tool_description: "Crie suas substituições estratégicas:",
            fields: &[
                ToolField {
                    key: "comportamento_antigo",
                    label: "Comportamento que você quer eliminar",
                    placeholder: "Ex: Rolar Instagram por 2h",
                },
                ToolField {
                    key: "novo_comportamento",
                    label: "Nova ação (que te dá satisfação)",
                    placeholder: "Ex: Ler 30 páginas de um livro",
                },
                ToolField {
                    key: "recompensa",
                    label: "Qual será sua recompensa?",
                    placeholder: "Ex: Assistir um episódio da série favorita",
                },
            ],
            ends_free_tier: true,
        }),
    },
    locked(4),
    locked(5),
    locked(6),
    locked(7),
];

/// Look up a step by its 1-based index.
pub fn step(index: u32) -> Option<&'static StepDefinition> {
    STEPS.iter().find(|s| s.index == index)
}

/// Open the eBook sales page in the system browser.
///
/// # Errors
/// Returns an error if no browser could be launched.
pub fn open_ebook() -> std::io::Result<()> {
    open::that(EBOOK_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> ToolAnswers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn catalog_shape() {
        assert_eq!(STEPS.len(), 7);
        for (i, s) in STEPS.iter().enumerate() {
            assert_eq!(s.index as usize, i + 1);
            assert_eq!(s.locked, s.index >= 4);
            assert_eq!(s.content.is_some(), !s.locked);
        }
        let points: Vec<u32> = STEPS.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![100, 150, 200, 0, 0, 0, 0]);
    }

    #[test]
    fn only_step_three_ends_free_tier() {
        let enders: Vec<u32> = STEPS
            .iter()
            .filter(|s| s.content.is_some_and(|c| c.ends_free_tier))
            .map(|s| s.index)
            .collect();
        assert_eq!(enders, vec![3]);
    }

    #[test]
    fn lookup_out_of_range() {
        assert!(step(0).is_none());
        assert!(step(8).is_none());
        assert_eq!(step(2).unwrap().title, "A Regra dos 5 Segundos");
    }

    #[test]
    fn validate_accepts_filled_fields() {
        let s = step(1).unwrap();
        let filled = answers(&[("momento", "20h"), ("emocao", "tédio"), ("ambiente", "quarto")]);
        assert!(s.validate_answers(&filled).is_ok());
    }

    #[test]
    fn validate_reports_blank_and_absent_fields() {
        let s = step(2).unwrap();
        let partial = answers(&[("situacao", "Instagram"), ("acao_alternativa", "   ")]);
        let err = s.validate_answers(&partial).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingAnswers {
                step: 2,
                missing: vec!["acao_alternativa".into(), "tempo_resistencia".into()],
            }
        );
    }

    #[test]
    fn locked_steps_have_no_required_fields() {
        assert_eq!(step(5).unwrap().required_fields().count(), 0);
    }

    #[test]
    fn paywall_notice_keeps_paragraphs() {
        assert!(PAYWALL_NOTICE.starts_with("Você completou"));
        assert!(PAYWALL_NOTICE.contains("\n\n• O Manual Secreto"));
        assert!(!PAYWALL_NOTICE.ends_with('\n'));
    }
}
