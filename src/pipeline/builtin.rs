//! Built-in Portuguese pattern tables.
//!
//! Phrases are matched folded (case and accents ignored) on word
//! boundaries; a trailing `*` turns a phrase into a prefix. Weights default
//! to 1; the classifier thresholds live next to the stages that use them.

use crate::pipeline::patterns::Label;

type Table = &'static [(&'static str, u32)];

const SPAM: Table = &[
    // Strong phrases: any one of these alone crosses the spam threshold.
    ("ganhe dinheiro", 3),
    ("dinheiro grátis", 3),
    ("dinheiro fácil", 3),
    ("renda extra", 3),
    ("milhões de reais", 3),
    ("prêmio em dinheiro", 3),
    ("você foi sorteado", 3),
    ("você foi selecionado", 3),
    ("você ganhou", 3),
    ("grande prêmio", 3),
    ("resgatar prêmio", 3),
    ("resgate seu prêmio", 3),
    ("taxa de liberação", 3),
    ("pequena taxa", 3),
    ("celular grátis", 3),
    ("iphone grátis", 3),
    ("lista privilegiada", 3),
    ("endereço sorteado", 3),
    ("mudou de vida", 3),
    ("trabalhe em casa e ganhe", 3),
    ("confirme seus dados bancários", 3),
    ("claim your prize", 3),
    ("you won", 3),
    // Weak cues: only count in combination.
    ("clique aqui", 1),
    ("clique agora", 1),
    ("confirme agora", 1),
    ("prazo limitado", 1),
    ("oportunidade única", 1),
    ("não perca", 1),
    ("últimas horas", 1),
    ("sortudo", 1),
    ("vencedor", 1),
    ("contemplado", 1),
    ("garantido", 1),
    ("100% grátis", 1),
    ("prize", 1),
    ("r$", 1),
    ("$$", 1),
    ("https://", 1),
    ("www.", 1),
];

const PROMOTION: Table = &[
    ("oferta", 1),
    ("ofertas", 1),
    ("promoção", 1),
    ("promoções", 1),
    ("desconto", 1),
    ("descontos", 1),
    ("% de desconto", 2),
    ("% off", 2),
    ("liquidação", 2),
    ("black friday", 2),
    ("cupom", 2),
    ("frete grátis", 2),
    ("compre já", 2),
    ("compre agora", 2),
    ("imperdível", 2),
    ("preço especial", 2),
    ("por tempo limitado", 2),
    ("aproveite", 1),
    ("venda", 1),
    ("comprar", 1),
    ("catálogo", 1),
    ("lançamento", 1),
    ("oportunidade de negócio", 1),
];

const NEWSLETTER: Table = &[
    ("newsletter", 2),
    ("boletim", 2),
    ("descadastrar", 2),
    ("descadastre-se", 2),
    ("cancelar inscrição", 2),
    ("cancelar a inscrição", 2),
    ("unsubscribe", 2),
    ("edição semanal", 2),
    ("edição mensal", 2),
    ("nesta edição", 2),
    ("você está recebendo este e-mail", 2),
    ("receber nossos e-mails", 2),
    ("resumo semanal", 1),
    ("novidades da semana", 1),
    ("campanha", 1),
    ("novidade comercial", 1),
];

const GRATITUDE: Table = &[
    ("obrigado", 1),
    ("obrigada", 1),
    ("muito obrigado", 1),
    ("muito obrigada", 1),
    ("agradeço", 1),
    ("agradecemos", 1),
    ("gratidão", 1),
    ("grato", 1),
    ("grata", 1),
    ("valeu", 1),
    ("thanks", 1),
    ("thank you", 1),
];

const ACTIONABLE: Table = &[
    ("preciso", 1),
    ("precisamos", 1),
    ("poderia", 1),
    ("poderiam", 1),
    ("pode me", 1),
    ("consegue", 1),
    ("solicito", 1),
    ("gostaria", 1),
    ("necessito", 1),
    ("favor", 1),
    ("aguardo", 1),
    ("envie", 1),
    ("verificar", 1),
    ("resolver", 1),
];

const TECHNICAL_SUPPORT: Table = &[
    ("problema", 2),
    ("problemas", 2),
    ("erro", 2),
    ("erros", 2),
    ("bug", 2),
    ("falha", 2),
    ("não funciona", 3),
    ("não está funcionando", 3),
    ("parou de funcionar", 3),
    ("quebrou", 2),
    ("travou", 2),
    ("travando", 2),
    ("suporte técnico", 3),
    ("assistência técnica", 2),
    ("sistema fora", 3),
    ("fora do ar", 3),
    ("acesso negado", 3),
    ("crash", 2),
    ("login", 1),
    ("senha", 1),
    ("conexão", 1),
    ("servidor", 1),
    ("instalação", 1),
    ("lento", 1),
];

const QUESTION: Table = &[
    ("dúvida", 3),
    ("dúvidas", 3),
    ("pergunta", 2),
    ("questão", 1),
    ("não entendi", 2),
    ("não entendo", 2),
    ("não sei", 1),
    ("explicar", 2),
    ("esclarecer", 2),
    ("orientação", 2),
    ("como faço", 2),
    ("como posso", 2),
    ("gostaria de saber", 2),
    ("qual", 1),
    ("quais", 1),
    ("?", 1),
];

const MEETING: Table = &[
    ("reunião", 3),
    ("reuniões", 3),
    ("agendar", 2),
    ("agendamento", 2),
    ("remarcar", 2),
    ("call", 2),
    ("videoconferência", 2),
    ("videochamada", 2),
    ("pauta", 2),
    ("google meet", 2),
    ("horário disponível", 2),
    ("disponibilidade", 1),
    ("zoom", 1),
    ("teams", 1),
    ("ata", 1),
    ("alinhamento", 1),
];

const INFORMATION: Table = &[
    ("para conhecimento", 3),
    ("para sua informação", 3),
    ("informo", 2),
    ("informamos", 2),
    ("comunico", 2),
    ("comunicamos", 2),
    ("comunicado", 2),
    ("fyi", 2),
    ("atualização", 1),
    ("status", 1),
    ("relatório", 1),
    ("aviso", 1),
    ("andamento", 1),
    ("progresso", 1),
];

const TASK: Table = &[
    ("solicito", 2),
    ("preciso que", 2),
    ("providenciar", 2),
    ("tarefa", 2),
    ("prazo", 2),
    ("por favor", 1),
    ("poderia", 1),
    ("entregar", 1),
    ("entrega", 1),
    ("pendente", 1),
    ("pendência", 1),
    ("revisar", 1),
    ("aprovar", 1),
    ("aprovação", 1),
    ("enviar", 1),
    ("demanda", 1),
    ("pedido", 1),
];

const INVITATION: Table = &[
    ("convite", 3),
    ("convidamos", 3),
    ("convido", 3),
    ("gostaria de convidar", 3),
    ("confraternização", 3),
    ("happy hour", 3),
    ("festa", 2),
    ("aniversário", 2),
    ("celebração", 2),
    ("comemoração", 2),
    ("churrasco", 2),
    ("casamento", 2),
    ("confirme presença", 2),
    ("confirmar presença", 2),
    ("rsvp", 2),
    ("almoço", 1),
    ("jantar", 1),
];

const CONVERSATION: Table = &[
    ("como vai", 2),
    ("tudo bem", 2),
    ("tudo bom", 2),
    ("saudades", 2),
    ("quanto tempo", 2),
    ("bate-papo", 2),
    ("e aí", 2),
    ("novidades", 1),
    ("fim de semana", 1),
    ("férias", 1),
    ("família", 1),
    ("conversar", 1),
    ("abraço", 1),
    ("abraços", 1),
    ("beijos", 1),
];

const POSITIVE_TONE: Table = &[
    ("ótimo", 1),
    ("ótima", 1),
    ("excelente", 1),
    ("obrigado", 1),
    ("obrigada", 1),
    ("agradeço", 1),
    ("parabéns", 1),
    ("satisfeito", 1),
    ("satisfeita", 1),
    ("feliz", 1),
    ("bom trabalho", 1),
    ("maravilhoso", 1),
    ("fantástico", 1),
    ("perfeito", 1),
    ("adorei", 1),
    ("gostei", 1),
    ("incrível", 1),
    ("sucesso", 1),
    ("contente", 1),
];

const NEGATIVE_TONE: Table = &[
    ("ruim", 1),
    ("péssimo", 1),
    ("péssima", 1),
    ("problema", 1),
    ("erro", 1),
    ("falha", 1),
    ("insatisfeito", 1),
    ("insatisfeita", 1),
    ("horrível", 1),
    ("terrível", 1),
    ("inaceitável", 1),
    ("frustrante", 1),
    ("frustrado", 1),
    ("decepcionado", 1),
    ("decepcionada", 1),
    ("absurdo", 1),
    ("irritado", 1),
    ("chateado", 1),
    ("reclamação", 1),
    ("lamentável", 1),
    ("descaso", 1),
];

const HIGH_URGENCY: Table = &[
    ("urgente", 1),
    ("urgência", 1),
    ("emergência", 1),
    ("crítico", 1),
    ("crítica", 1),
    ("imediato", 1),
    ("imediatamente", 1),
    ("agora", 1),
    ("hoje", 1),
    ("asap", 1),
    ("prioridade máxima", 1),
    ("sem demora", 1),
    ("rapidamente", 1),
    ("o quanto antes", 1),
    ("o mais rápido possível", 1),
    ("não pode esperar", 1),
];

const MEDIUM_URGENCY: Table = &[
    ("importante", 1),
    ("necessário", 1),
    ("breve", 1),
    ("em breve", 1),
    ("logo", 1),
    ("prazo", 1),
    ("amanhã", 1),
    ("esta semana", 1),
    ("nesta semana", 1),
    ("prioridade", 1),
];

const LOW_URGENCY: Table = &[
    ("quando possível", 1),
    ("quando puder", 1),
    ("sem pressa", 1),
    ("sem urgência", 1),
    ("não é urgente", 1),
    ("nada urgente", 1),
    ("com calma", 1),
    ("conveniência", 1),
];

const ATTACHMENT: Table = &[
    ("anexo", 1),
    ("anexos", 1),
    ("anexado", 1),
    ("anexada", 1),
    ("anexados", 1),
    ("anexadas", 1),
    ("anexei", 1),
    ("anexando", 1),
    ("em anexo", 1),
    ("segue anexo", 1),
    ("segue em anexo", 1),
    ("vai anexo", 1),
    ("encontra-se anexo", 1),
    ("arquivo anexo", 1),
    ("arquivo em anexo", 1),
    ("documento anexo", 1),
    ("planilha anexa", 1),
    ("attached", 1),
    ("see attached", 1),
    ("attachment", 1),
    ("attachments", 1),
];

const SUSPICIOUS_ATTACHMENT: Table = &[
    ("clique no anexo", 15),
    ("abra o anexo", 15),
    ("execute o arquivo", 15),
    ("instale o programa", 15),
    ("baixe e execute", 15),
    ("arquivo importante", 15),
    ("documento urgente anexo", 15),
];

/// Every built-in table with its label.
pub fn tables() -> Vec<(Label, Table)> {
    vec![
        (Label::Spam, SPAM),
        (Label::Promotion, PROMOTION),
        (Label::Newsletter, NEWSLETTER),
        (Label::Gratitude, GRATITUDE),
        (Label::Actionable, ACTIONABLE),
        (Label::TechnicalSupport, TECHNICAL_SUPPORT),
        (Label::Question, QUESTION),
        (Label::Meeting, MEETING),
        (Label::Information, INFORMATION),
        (Label::Task, TASK),
        (Label::Invitation, INVITATION),
        (Label::Conversation, CONVERSATION),
        (Label::PositiveTone, POSITIVE_TONE),
        (Label::NegativeTone, NEGATIVE_TONE),
        (Label::HighUrgency, HIGH_URGENCY),
        (Label::MediumUrgency, MEDIUM_URGENCY),
        (Label::LowUrgency, LOW_URGENCY),
        (Label::Attachment, ATTACHMENT),
        (Label::SuspiciousAttachment, SUSPICIOUS_ATTACHMENT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_has_a_table() {
        let labels: Vec<Label> = tables().into_iter().map(|(l, _)| l).collect();
        for label in Label::ALL {
            assert!(labels.contains(&label), "missing table for {label}");
        }
    }

    #[test]
    fn no_duplicate_phrases_within_a_table() {
        for (label, table) in tables() {
            let mut seen: Vec<String> = Vec::new();
            for (phrase, _) in table {
                let folded = crate::text::fold(phrase);
                assert!(!seen.contains(&folded), "{label}: duplicate {phrase}");
                seen.push(folded);
            }
        }
    }
}
