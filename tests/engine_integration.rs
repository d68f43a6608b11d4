//! Integration tests for the public triage facade.
//!
//! Everything goes through `TriageEngine`, the way the CLI and any other
//! caller would use it.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use email_triage::config::TriageConfig;
use email_triage::engine::TriageEngine;
use email_triage::error::{InputError, ItemError};
use email_triage::pipeline::batch::ItemOutcome;
use email_triage::pipeline::patterns::{Label, PatternRegistry};
use email_triage::pipeline::types::{Category, DecisionStage, Subcategory, Tone, Urgency};
use email_triage::reply::ResponseKind;
use email_triage::thread::ParseMethod;

/// Maximum time any batch test may run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

fn engine() -> TriageEngine {
    TriageEngine::new()
}

fn batch_of(n: usize) -> Vec<String> {
    let bodies = [
        "O sistema apresenta erro ao gerar a nota fiscal, podem ajudar?",
        "Muito obrigado pela apresentação de ontem, ficou excelente!",
        "Podemos agendar uma reunião na terça para revisar o cronograma?",
        "Black Friday: 70% de desconto em todos os produtos, aproveite!",
        "Segue em anexo o relatório mensal para conhecimento.",
    ];
    (0..n).map(|i| bodies[i % bodies.len()].to_string()).collect()
}

// ── Classification ──────────────────────────────────────────────────

#[test]
fn empty_email_gets_defaults() {
    let result = engine().classify("");
    assert_eq!(result.category, Category::Unproductive);
    assert_eq!(result.subcategory, Subcategory::Undefined);
    assert_eq!(result.tone, Tone::Neutral);
    assert_eq!(result.urgency, Urgency::Low);
    assert_eq!(result.word_count, 0);
    assert_eq!(result.stage, DecisionStage::Fallback);
}

#[test]
fn high_urgency_survives_long_neutral_text() {
    let engine = engine();
    let short = engine.classify("urgente, preciso agora");
    assert_eq!(short.urgency, Urgency::High);

    let padding = "Este parágrafo descreve o andamento geral das atividades da semana. ".repeat(80);
    let long = engine.classify(&format!("{padding}\nurgente, preciso agora\n{padding}"));
    assert_eq!(long.urgency, Urgency::High);
}

#[test]
fn tone_tie_is_neutral() {
    assert_eq!(engine().classify("Segue a planilha de horas.").tone, Tone::Neutral);
}

#[test]
fn classification_is_idempotent() {
    let engine = engine();
    let text = "Bom dia, o servidor caiu e precisamos de suporte urgente. Segue o log em anexo.";
    assert_eq!(engine.classify(text), engine.classify(text));
}

#[test]
fn serialized_labels_are_portuguese() {
    let result = engine().classify("O sistema não funciona, erro crítico no login. Urgente!");
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["category"], "Produtivo");
    assert_eq!(json["subcategory"], "Suporte Técnico");
    assert_eq!(json["urgency"], "Alta");
    assert_eq!(json["stage"], "topical");
}

#[test]
fn registry_override_changes_classification() {
    let text = "Que tal um rodízio de pizza no sábado?";
    let config = TriageConfig::default();

    let before = TriageEngine::with_registry(Arc::new(PatternRegistry::builtin()), config.clone());
    assert_ne!(before.classify(text).subcategory, Subcategory::Invitation);

    let registry = PatternRegistry::builder().add(Label::Invitation, "rodízio", 5).build();
    let after = TriageEngine::with_registry(Arc::new(registry), config);
    assert_eq!(after.classify(text).subcategory, Subcategory::Invitation);
}

#[test]
fn overrides_file_via_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"replace": true, "sets": {{"spam": ["pirâmide financeira"]}}}}"#
    )
    .unwrap();

    let config = TriageConfig {
        patterns_path: Some(file.path().to_path_buf()),
        ..TriageConfig::default()
    };
    let engine = TriageEngine::from_config(config).unwrap();

    // Weight 1 stays under the spam threshold on its own.
    let result = engine.classify("Participe da pirâmide financeira");
    assert_ne!(result.subcategory, Subcategory::Spam);
    // Replaced set: built-in spam phrases no longer count.
    let result = engine.classify("Você foi sorteado! Clique aqui para resgatar seu prêmio.");
    assert_ne!(result.stage, DecisionStage::Spam);
}

// ── Replies ─────────────────────────────────────────────────────────

#[test]
fn every_label_combination_has_a_reply() {
    let engine = engine();
    for category in Category::ALL {
        for subcategory in Subcategory::ALL {
            for tone in Tone::ALL {
                for urgency in Urgency::ALL {
                    let reply = engine.generate_response(category, subcategory, tone, urgency);
                    assert!(!reply.trim().is_empty(), "{category}/{subcategory}/{tone}/{urgency}");
                }
            }
        }
    }
}

#[test]
fn free_form_labels_never_give_empty_reply() {
    let engine = engine();
    for labels in [
        ("", "", "", ""),
        ("Produtivo", "inexistente", "", ""),
        ("social", "Convite", "positivo", "baixa"),
        ("???", "Spam", "Neutro", "Alta"),
    ] {
        let reply = engine.generate_response_from_labels(labels.0, labels.1, labels.2, labels.3);
        assert!(!reply.is_empty());
    }
}

// ── Summary ─────────────────────────────────────────────────────────

#[test]
fn summary_respects_limit_and_order() {
    let text = "Prezados, bom dia. \
        Informo que o projeto de migração entrou na fase final. \
        Solicito que a equipe de infraestrutura revise o cronograma até 20/04/2025. \
        O orçamento previsto é de R$ 48.500,00 e não pode ser excedido. \
        O café da copa acabou novamente. \
        A reunião de alinhamento será na quinta às 10h. \
        Qualquer dúvida, estou à disposição.";
    let engine = engine();

    for n in 1..=4 {
        let result = engine.summarize(text, Some(n));
        assert!(result.summary.len() <= n);
        let positions: Vec<usize> =
            result.summary.iter().map(|s| text.find(s.as_str()).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!((0.0..100.0).contains(&result.word_reduction));
    }
}

#[test]
fn summary_of_empty_text() {
    let result = engine().summarize("", Some(3));
    assert!(result.summary.is_empty());
    assert_eq!(result.word_reduction, 0.0);
    assert_eq!(result.original_word_count, 0);
}

// ── Batch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_above_cap_is_rejected() {
    let result = timeout(TEST_TIMEOUT, engine().classify_batch(batch_of(51)))
        .await
        .expect("batch timed out");
    assert!(matches!(result, Err(InputError::BatchTooLarge { size: 51, limit: 50 })));
}

#[tokio::test]
async fn batch_with_one_malformed_item() {
    let mut texts = batch_of(50);
    texts[6] = String::new();

    let report = timeout(TEST_TIMEOUT, engine().classify_batch(texts))
        .await
        .expect("batch timed out")
        .unwrap();

    assert_eq!(report.total, 50);
    assert_eq!(report.successful, 49);
    assert_eq!(report.failed, 1);
    assert!(matches!(report.items[6].error(), Some(ItemError::TooShort { .. })));
    assert!(report.items.iter().enumerate().all(|(i, item)| item.index == i));
}

#[tokio::test]
async fn batch_results_match_single_classification() {
    let engine = engine();
    let texts = batch_of(5);
    let report = timeout(TEST_TIMEOUT, engine.classify_batch(texts.clone()))
        .await
        .expect("batch timed out")
        .unwrap();

    for (item, text) in report.items.iter().zip(&texts) {
        match &item.outcome {
            ItemOutcome::Success(processed) => {
                assert_eq!(processed.classification, engine.classify(text));
                assert!(!processed.suggested_response.is_empty());
            }
            ItemOutcome::Failure { error } => panic!("item {} failed: {error}", item.index),
        }
    }
}

#[tokio::test]
async fn promotion_in_batch_is_automated() {
    let report = engine().classify_batch(batch_of(4)).await.unwrap();
    match &report.items[3].outcome {
        ItemOutcome::Success(processed) => {
            assert_eq!(processed.classification.subcategory, Subcategory::Promotion);
            assert_eq!(processed.response_kind, ResponseKind::Automated);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn configured_batch_limit_applies() {
    let config = TriageConfig {
        max_batch_size: 5,
        ..TriageConfig::default()
    };
    let engine = TriageEngine::with_registry(Arc::new(PatternRegistry::builtin()), config);
    let err = engine.classify_batch(batch_of(6)).await.unwrap_err();
    assert!(matches!(err, InputError::BatchTooLarge { size: 6, limit: 5 }));
}

// ── Threads ─────────────────────────────────────────────────────────

#[test]
fn thread_with_headers_and_separators() {
    let engine = engine();

    let headers = engine.parse_thread(
        "De: maria@empresa.com\nAssunto: Orçamento\n\nSegue o orçamento revisado.\n\n\
         De: carlos@empresa.com\nAssunto: Re: Orçamento\n\nRecebido, obrigado!",
    );
    assert_eq!(headers.len(), 2);
    assert!(headers.iter().all(|e| e.method == ParseMethod::Headers));
    assert_eq!(headers[1].from.as_deref(), Some("carlos@empresa.com"));

    let separated = engine.parse_thread(
        "Primeira mensagem sobre o contrato.\n###\nSegunda mensagem sobre o contrato.",
    );
    assert_eq!(separated.len(), 2);
    assert!(separated.iter().all(|e| e.method == ParseMethod::Separators));
}
