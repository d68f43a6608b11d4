//! Reply template table.
//!
//! Placeholders: `{saudacao}` greeting, `{abertura}` tone-dependent opener,
//! `{prazo}` urgency acknowledgment. An entry with `tone: None` and a
//! concrete urgency applies to every tone at that urgency.

use crate::pipeline::types::{Category, Subcategory, Tone, Urgency};

/// One row of the template table.
#[derive(Debug, Clone, Copy)]
pub struct TemplateEntry {
    pub category: Category,
    pub subcategory: Option<Subcategory>,
    pub tone: Option<Tone>,
    pub urgency: Option<Urgency>,
    pub text: &'static str,
}

const fn entry(
    category: Category,
    subcategory: Option<Subcategory>,
    tone: Option<Tone>,
    urgency: Option<Urgency>,
    text: &'static str,
) -> TemplateEntry {
    TemplateEntry {
        category,
        subcategory,
        tone,
        urgency,
        text,
    }
}

use Category::{Productive, Social, Unproductive};
use Subcategory as S;

/// Last-resort reply; needs no placeholder.
pub const UNIVERSAL: &str =
    "Obrigado pelo seu contato. Sua mensagem foi recebida e será analisada adequadamente.";

pub const ENTRIES: &[TemplateEntry] = &[
    // ── Produtivo ───────────────────────────────────────────────────
    entry(Productive, Some(S::TechnicalSupport), None, Some(Urgency::High),
        "{saudacao} {abertura}Recebemos sua solicitação de suporte técnico urgente. Nossa equipe técnica foi notificada e entrará em contato imediatamente. {prazo}"),
    entry(Productive, Some(S::TechnicalSupport), None, Some(Urgency::Medium),
        "{saudacao} {abertura}Nossa equipe de suporte técnico analisará sua questão e retornará em breve. {prazo}"),
    entry(Productive, Some(S::TechnicalSupport), None, Some(Urgency::Low),
        "{saudacao} {abertura}Sua solicitação de suporte foi recebida. Retornaremos com uma solução assim que possível. {prazo}"),
    entry(Productive, Some(S::TechnicalSupport), Some(Tone::Negative), Some(Urgency::High),
        "{saudacao} Lamentamos profundamente o transtorno. Seu chamado foi marcado como prioridade máxima e nossa equipe técnica já está atuando. {prazo}"),
    entry(Productive, Some(S::Question), None, None,
        "{saudacao} {abertura}Obrigado pela sua pergunta. Nossa equipe analisará sua dúvida e retornará com esclarecimentos detalhados em breve. {prazo}"),
    entry(Productive, Some(S::Meeting), None, None,
        "{saudacao} Obrigado pelo contato. Recebemos sua proposta de reunião e retornaremos confirmando a disponibilidade de agenda. {prazo}"),
    entry(Productive, Some(S::Meeting), None, Some(Urgency::High),
        "{saudacao} Obrigado pelo contato. Vamos verificar a agenda com prioridade e confirmar o horário da reunião ainda hoje."),
    entry(Productive, Some(S::Information), None, None,
        "{saudacao} Obrigado pela informação. Registramos seu comunicado e tomaremos as medidas apropriadas se necessário."),
    entry(Productive, Some(S::Task), None, None,
        "{saudacao} {abertura}Recebemos sua solicitação e ela foi encaminhada ao setor responsável. {prazo}"),
    entry(Productive, Some(S::Task), None, Some(Urgency::High),
        "{saudacao} {abertura}Recebemos sua solicitação urgente, que foi encaminhada com prioridade ao setor responsável. {prazo}"),
    entry(Productive, None, None, None,
        "{saudacao} {abertura}Obrigado pelo seu contato. Recebemos sua mensagem e nossa equipe está analisando. {prazo}"),
    // ── Social ──────────────────────────────────────────────────────
    entry(Social, Some(S::Gratitude), None, None,
        "{saudacao} Ficamos muito felizes com seu agradecimento! É uma grande satisfação saber que pudemos ajudar."),
    entry(Social, Some(S::Invitation), None, None,
        "{saudacao} Muito obrigado pelo convite! Vamos verificar a agenda e confirmaremos presença em breve."),
    entry(Social, Some(S::Conversation), None, None,
        "{saudacao} Que bom receber sua mensagem! Responderemos com calma em breve."),
    entry(Social, Some(S::Conversation), Some(Tone::Negative), None,
        "{saudacao} Sentimos muito pelo momento difícil. Estamos à disposição para o que precisar."),
    entry(Social, None, None, None,
        "{saudacao} Obrigado pela mensagem! Ficamos felizes com seu contato."),
    // ── Improdutivo ─────────────────────────────────────────────────
    entry(Unproductive, Some(S::Spam), None, None,
        "Email identificado como spam - nenhuma resposta será enviada."),
    entry(Unproductive, Some(S::Promotion), None, None,
        "Conteúdo promocional recebido. Arquivado para referência."),
    entry(Unproductive, Some(S::Newsletter), None, None,
        "Newsletter recebida e arquivada para leitura posterior."),
    entry(Unproductive, Some(S::Undefined), None, None,
        "{saudacao} Obrigado pela sua mensagem. Ela foi recebida e será analisada adequadamente."),
    entry(Unproductive, None, None, None,
        "{saudacao} Obrigado pela sua mensagem. Ficamos felizes com seu contato e continuamos à disposição."),
];
