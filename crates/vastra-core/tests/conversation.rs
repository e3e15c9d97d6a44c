use std::sync::Arc;
use std::time::Duration;

use vastra_core::engine::ReplyCategory;
use vastra_core::templates::{TemplateCatalog, TomlCatalog};
use vastra_core::{Engine, Intent, Topic, VastraConfig};

fn engine() -> Engine {
    Engine::from_config(VastraConfig::default()).unwrap()
}

fn engine_with(edit: impl FnOnce(&mut VastraConfig)) -> Engine {
    let mut config = VastraConfig::default();
    edit(&mut config);
    Engine::from_config(config).unwrap()
}

fn body(key: &str, lang: &str) -> String {
    TomlCatalog::builtin()
        .unwrap()
        .lookup(key, lang)
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_greeting_skips_classifier() {
    let e = engine();
    let reply = e.respond(Some("g"), "hi").await;

    assert_eq!(reply.category, ReplyCategory::Greeting);
    assert_eq!(reply.response, body("greeting", "en"));
    assert!(reply.trace.is_none());
    assert!(reply.images.is_none());
}

#[tokio::test]
async fn test_gratitude_in_kannada() {
    let e = engine();
    let reply = e.respond(Some("g"), "ಧನ್ಯವಾದಗಳು").await;
    assert_eq!(reply.category, ReplyCategory::Gratitude);
    assert_eq!(reply.language, "kn");
    assert_eq!(reply.response, body("gratitude", "kn"));
}

#[tokio::test]
async fn test_out_of_scope() {
    let e = engine();
    let reply = e.respond(Some("o"), "what's the weather").await;

    assert_eq!(reply.category, ReplyCategory::OutOfScope);
    assert_eq!(reply.response, body("out_of_scope", "en"));
    let session = e.store().snapshot("o").unwrap();
    assert_eq!(session.history, vec!["what's the weather"]);
    assert!(session.context.last_intent.is_none());
}

#[tokio::test]
async fn test_short_follow_up_stays_in_scope() {
    let e = engine();
    e.respond(Some("f"), "wedding outfit please").await;
    let reply = e.respond(Some("f"), "what about for my cousin").await;
    assert_eq!(reply.category, ReplyCategory::Classified);
}

#[tokio::test]
async fn test_office_then_men() {
    let e = engine();
    let first = e.respond(Some("c"), "office wear ideas").await;
    assert_eq!(first.intent, Some(Topic::FormalOffice.into()));

    let second = e.respond(Some("c"), "for men").await;
    assert_eq!(second.intent, Some(Topic::MenOffice.into()));
    assert_eq!(second.response, body("men_office", "en"));
    assert_eq!(second.trace.unwrap().rule, "men_after_office");
}

#[tokio::test]
async fn test_wedding_thread() {
    let e = engine();
    assert_eq!(
        e.respond(Some("w"), "I have a wedding next month").await.intent,
        Some(Topic::Wedding.into())
    );
    assert_eq!(
        e.respond(Some("w"), "makeup").await.intent,
        Some(Topic::WeddingMakeup.into())
    );
    assert_eq!(
        e.respond(Some("w"), "outfit").await.intent,
        Some(Topic::Wedding.into())
    );
    assert_eq!(
        e.respond(Some("w"), "for the groom").await.intent,
        Some(Topic::MenWedding.into())
    );
}

#[tokio::test]
async fn test_saree_color_continuation() {
    let e = engine();
    e.respond(Some("k"), "show me kanchipuram sarees").await;

    let reply = e.respond(Some("k"), "green").await;
    assert_eq!(reply.intent, Some(Topic::SareeColorChange.into()));
    assert!(reply.response.contains("Rich green color"));

    let reply = e.respond(Some("k"), "maroon").await;
    assert_eq!(reply.intent, Some(Topic::SareeColorChange.into()));
    assert!(reply.response.starts_with("**Maroon"));
}

#[tokio::test]
async fn test_continuation_keyword_overlap() {
    let e = engine();
    e.respond(Some("p"), "party dress").await;
    let reply = e.respond(Some("p"), "yes more party ideas").await;
    assert_eq!(reply.intent, Some(Intent::Continue(Topic::Party)));

    // continuing again keeps the base topic
    let reply = e.respond(Some("p"), "yes more party ideas").await;
    assert_eq!(reply.intent, Some(Intent::Continue(Topic::Party)));
    assert_eq!(reply.response, body("party", "en"));
}

#[tokio::test]
async fn test_keyword_cap_keeps_recent() {
    let e = engine();
    for i in 1..=100 {
        e.respond(Some("cap"), &format!("red{i}")).await;
    }
    let ctx = e.store().snapshot("cap").unwrap().context;
    assert_eq!(ctx.keywords.len(), 75);
    assert_eq!(ctx.keywords[0], "red26");
    assert_eq!(ctx.keywords.last().map(String::as_str), Some("red100"));
}

#[tokio::test]
async fn test_history_cap() {
    let e = engine_with(|c| c.memory.max_history = 10);
    for i in 0..25 {
        e.respond(Some("h"), &format!("saree {i}")).await;
    }
    let history = e.store().snapshot("h").unwrap().history;
    assert_eq!(history.len(), 10);
    assert_eq!(history[0], "saree 15");
}

#[tokio::test]
async fn test_eviction_removes_whole_session() {
    let e = engine();
    e.respond(Some("old"), "wedding makeup").await;
    e.respond(Some("new"), "party makeup").await;

    let later = chrono::Utc::now() + chrono::TimeDelta::hours(2);
    e.store().with_session("new", later, |_| ());
    let removed = e.store().evict_inactive(later, Duration::from_secs(3600));

    assert_eq!(removed, 1);
    assert!(e.store().snapshot("old").is_none());
    let fresh = e.store().get("old", later);
    assert!(fresh.history.is_empty());
    assert!(fresh.context.keywords.is_empty());
    assert!(fresh.context.last_intent.is_none());
}

#[tokio::test]
async fn test_capacity_drops_oldest_on_turn() {
    let e = engine_with(|c| {
        c.memory.max_sessions = 4;
        c.memory.cleanup_threshold = 1.0;
    });
    for i in 0..6 {
        e.respond(Some(&format!("s{i}")), "saree").await;
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert!(e.store().snapshot("s0").is_none());
    assert!(e.store().snapshot("s5").is_some());
    assert_eq!(e.store().evicted_total(), 1);
}

#[tokio::test]
async fn test_capacity_spares_the_returning_session() {
    let e = engine_with(|c| {
        c.memory.max_sessions = 2;
        c.memory.cleanup_threshold = 0.5;
        c.memory.inactive_timeout_secs = 1;
    });

    let first = e.respond(Some("me"), "wedding outfit").await;
    assert_eq!(first.intent, Some(Topic::Wedding.into()));

    // "me" goes idle past the timeout while someone else arrives
    tokio::time::sleep(Duration::from_millis(1200)).await;
    e.respond(Some("other"), "saree").await;

    let reply = e.respond(Some("me"), "for men").await;
    assert_eq!(reply.category, ReplyCategory::Classified);
    assert_eq!(reply.intent, Some(Topic::MenWedding.into()));

    let session = e.store().snapshot("me").unwrap();
    assert_eq!(session.history, vec!["wedding outfit", "for men"]);
}

#[tokio::test]
async fn test_concurrent_turns_same_session_lose_nothing() {
    let e = Arc::new(engine_with(|c| c.memory.max_keywords = 1000));

    let turns = (0..50).map(|i| {
        let e = Arc::clone(&e);
        tokio::spawn(async move { e.respond(Some("shared"), &format!("red saree {i}")).await })
    });
    for reply in futures::future::join_all(turns).await {
        assert_eq!(reply.unwrap().category, ReplyCategory::Classified);
    }

    let session = e.store().snapshot("shared").unwrap();
    assert_eq!(session.history.len(), 50);
    assert_eq!(session.context.keywords.len(), 100);
}

#[tokio::test]
async fn test_parallel_sessions_are_independent() {
    let e = Arc::new(engine());

    let tasks = (0..20).map(|s| {
        let e = Arc::clone(&e);
        tokio::spawn(async move {
            let key = format!("user-{s}");
            for _ in 0..5 {
                e.respond(Some(&key), "casual wear").await;
            }
        })
    });
    futures::future::join_all(tasks).await;

    assert_eq!(e.store().len(), 20);
    for key in e.store().keys() {
        let session = e.store().snapshot(&key).unwrap();
        assert_eq!(session.history.len(), 5);
        assert_eq!(session.context.last_intent, Some(Topic::CasualWear.into()));
    }
}
