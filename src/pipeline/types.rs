//! Shared types for the classification pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::pipeline::patterns::Label;
use crate::text::fold;

// ── Taxonomy ────────────────────────────────────────────────────────

/// Top-level productivity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Produtivo")]
    Productive,
    #[serde(rename = "Social")]
    Social,
    #[serde(rename = "Improdutivo")]
    Unproductive,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Productive, Self::Social, Self::Unproductive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "Produtivo",
            Self::Social => "Social",
            Self::Unproductive => "Improdutivo",
        }
    }
}

/// Finer label within a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subcategory {
    #[serde(rename = "Spam")]
    Spam,
    #[serde(rename = "Promoção")]
    Promotion,
    #[serde(rename = "Newsletter")]
    Newsletter,
    #[serde(rename = "Indefinido")]
    Undefined,
    #[serde(rename = "Agradecimento")]
    Gratitude,
    #[serde(rename = "Convite")]
    Invitation,
    #[serde(rename = "Conversa")]
    Conversation,
    #[serde(rename = "Suporte Técnico")]
    TechnicalSupport,
    #[serde(rename = "Dúvida")]
    Question,
    #[serde(rename = "Reunião")]
    Meeting,
    #[serde(rename = "Informação")]
    Information,
    #[serde(rename = "Tarefa")]
    Task,
}

impl Subcategory {
    pub const ALL: [Subcategory; 12] = [
        Self::Spam,
        Self::Promotion,
        Self::Newsletter,
        Self::Undefined,
        Self::Gratitude,
        Self::Invitation,
        Self::Conversation,
        Self::TechnicalSupport,
        Self::Question,
        Self::Meeting,
        Self::Information,
        Self::Task,
    ];

    /// Subcategories scored in the topical pass, in tie-break order.
    pub const TOPICAL: [Subcategory; 7] = [
        Self::TechnicalSupport,
        Self::Question,
        Self::Meeting,
        Self::Information,
        Self::Task,
        Self::Invitation,
        Self::Conversation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "Spam",
            Self::Promotion => "Promoção",
            Self::Newsletter => "Newsletter",
            Self::Undefined => "Indefinido",
            Self::Gratitude => "Agradecimento",
            Self::Invitation => "Convite",
            Self::Conversation => "Conversa",
            Self::TechnicalSupport => "Suporte Técnico",
            Self::Question => "Dúvida",
            Self::Meeting => "Reunião",
            Self::Information => "Informação",
            Self::Task => "Tarefa",
        }
    }

    /// The category this subcategory belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Spam | Self::Promotion | Self::Newsletter | Self::Undefined => {
                Category::Unproductive
            }
            Self::Gratitude | Self::Invitation | Self::Conversation => Category::Social,
            Self::TechnicalSupport
            | Self::Question
            | Self::Meeting
            | Self::Information
            | Self::Task => Category::Productive,
        }
    }

    /// Pattern set that selects this subcategory, if it has one.
    pub fn label(&self) -> Option<Label> {
        match self {
            Self::Spam => Some(Label::Spam),
            Self::Promotion => Some(Label::Promotion),
            Self::Newsletter => Some(Label::Newsletter),
            Self::Undefined => None,
            Self::Gratitude => Some(Label::Gratitude),
            Self::Invitation => Some(Label::Invitation),
            Self::Conversation => Some(Label::Conversation),
            Self::TechnicalSupport => Some(Label::TechnicalSupport),
            Self::Question => Some(Label::Question),
            Self::Meeting => Some(Label::Meeting),
            Self::Information => Some(Label::Information),
            Self::Task => Some(Label::Task),
        }
    }
}

/// Inferred emotional valence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    #[serde(rename = "Positivo")]
    Positive,
    #[serde(rename = "Negativo")]
    Negative,
    #[serde(rename = "Neutro")]
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "Positivo",
            Self::Negative => "Negativo",
            Self::Neutral => "Neutro",
        }
    }
}

/// Inferred time-sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "Alta",
            Self::Medium => "Média",
            Self::Low => "Baixa",
        }
    }
}

// Display and lenient parsing. Labels are compared folded, so "media",
// "MÉDIA" and the English variant name all parse.

macro_rules! label_enum {
    ($ty:ident, $field:literal, [$($english:literal => $variant:ident),* $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = InputError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = fold(s.trim());
                if let Some(found) = Self::ALL.iter().find(|v| fold(v.as_str()) == wanted) {
                    return Ok(*found);
                }
                match wanted.as_str() {
                    $($english => Ok(Self::$variant),)*
                    _ => Err(InputError::UnknownLabel {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

label_enum!(Category, "category", [
    "productive" => Productive,
    "unproductive" => Unproductive,
]);

label_enum!(Subcategory, "subcategory", [
    "promocao" => Promotion,
    "promotion" => Promotion,
    "undefined" => Undefined,
    "gratitude" => Gratitude,
    "invitation" => Invitation,
    "conversation" => Conversation,
    "technical support" => TechnicalSupport,
    "suporte" => TechnicalSupport,
    "question" => Question,
    "meeting" => Meeting,
    "information" => Information,
    "task" => Task,
]);

label_enum!(Tone, "tone", [
    "positive" => Positive,
    "negative" => Negative,
    "neutral" => Neutral,
]);

label_enum!(Urgency, "urgency", [
    "high" => High,
    "medium" => Medium,
    "low" => Low,
]);

// ── Analyzer outputs ────────────────────────────────────────────────

/// Security risk of the attachment language in an email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    #[serde(rename = "Seguro")]
    Safe,
    #[serde(rename = "Baixo")]
    Low,
    #[serde(rename = "Médio")]
    Medium,
    #[serde(rename = "Alto")]
    High,
}

impl RiskLevel {
    /// Map an accumulated risk score to a level.
    pub fn from_score(score: u32) -> Self {
        match score {
            40.. => Self::High,
            25.. => Self::Medium,
            10.. => Self::Low,
            _ => Self::Safe,
        }
    }
}

/// Result of scanning an email for attachment references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentAnalysis {
    pub has_attachments_mentioned: bool,
    /// Distinct matched phrases, declared casing, in order of first occurrence.
    pub attachment_keywords: Vec<String>,
    /// Total number of matches (unweighted).
    pub score: u32,
    pub security_risk: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_flags: Vec<String>,
    #[serde(default)]
    pub context: AttachmentContext,
}

/// What the email around an attachment is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentTopic {
    #[serde(rename = "solicitacao_documento")]
    DocumentRequest,
    #[serde(rename = "compartilhamento")]
    Sharing,
    #[serde(rename = "trabalho_profissional")]
    ProfessionalWork,
    #[serde(rename = "suporte_tecnico")]
    TechnicalSupport,
    #[serde(rename = "administrativo")]
    Administrative,
    #[serde(rename = "comunicacao_interna")]
    InternalCommunication,
}

/// Why the attachment is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachmentPurpose {
    #[serde(rename = "evidencia")]
    Evidence,
    #[serde(rename = "referencia")]
    Reference,
    #[serde(rename = "acao_requerida")]
    ActionRequired,
    #[serde(rename = "informacao")]
    Information,
}

/// Surrounding context of the attachment language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentContext {
    /// Topics in declaration order.
    pub contexts: Vec<AttachmentTopic>,
    pub purposes: Vec<AttachmentPurpose>,
    /// Attachment mentions per 100 words.
    pub mention_density: f64,
    /// Number of topics plus number of purposes.
    pub context_score: u32,
}

// ── Classification result ───────────────────────────────────────────

/// Which stage of the decision pipeline produced the subcategory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    Spam,
    Marketing,
    SimpleThanks,
    Topical,
    /// Nothing matched; defaulted to Improdutivo / Indefinido.
    Fallback,
}

impl DecisionStage {
    /// Fixed confidence reported for decisions made at this stage.
    pub fn confidence(&self) -> f32 {
        match self {
            Self::Spam => 0.95,
            Self::Marketing => 0.85,
            Self::SimpleThanks => 0.90,
            Self::Topical => 0.85,
            Self::Fallback => 0.50,
        }
    }
}

/// Full classification of one email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub subcategory: Subcategory,
    pub tone: Tone,
    pub urgency: Urgency,
    pub attachment_analysis: AttachmentAnalysis,
    pub word_count: usize,
    pub char_count: usize,
    pub stage: DecisionStage,
    pub confidence: f32,
    /// Phrases that drove the subcategory decision, in pattern order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_keywords: Vec<String>,
}
