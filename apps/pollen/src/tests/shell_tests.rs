use super::*;

use marketplace_core::LedgerPolicy;
use storage::Storage;

async fn shell(json: bool) -> Shell<Storage> {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    Shell::new(MarketplaceContext::new(storage, LedgerPolicy::default()), json)
}

async fn run(shell: &mut Shell<Storage>, line: &str) -> String {
    let mut out = Vec::new();
    shell.execute(line, &mut out).await.expect("execute");
    String::from_utf8(out).expect("utf8")
}

const REGISTER: &str =
    "register --name 'Maya Chen' --email maya@example.com --password pw --confirm pw";

#[test]
fn split_words_respects_quotes() {
    assert_eq!(
        split_words(r#"post --title "Mock Loop" --price '' x"#).expect("split"),
        vec!["post", "--title", "Mock Loop", "--price", "", "x"]
    );
    assert!(split_words("search 'open").is_err());
    assert!(split_words("   ").expect("split").is_empty());
}

#[tokio::test]
async fn catalog_commands_are_gated_until_login() {
    let mut shell = shell(false).await;
    let output = run(&mut shell, "services").await;
    assert!(output.contains("error: log in"), "{output}");

    let output = run(&mut shell, REGISTER).await;
    assert!(output.contains("Logged in as maya@example.com."), "{output}");
    assert!(output.contains("== Explore =="), "{output}");
}

#[tokio::test]
async fn search_filter_and_sort_rerender_catalog() {
    let mut shell = shell(false).await;
    run(&mut shell, REGISTER).await;

    let output = run(&mut shell, "search amazon").await;
    assert!(output.contains("Amazon Interview Prep"), "{output}");
    assert!(!output.contains("Tech Resume Review"), "{output}");

    run(&mut shell, "search").await;
    let output = run(&mut shell, "category Career Guidance").await;
    assert!(output.contains("Early Career Planning Session"), "{output}");
    assert!(!output.contains("== Featured =="), "{output}");

    let output = run(&mut shell, "category xyz").await;
    assert!(output.contains(shared::protocol::NO_MATCHING_SERVICES), "{output}");

    let output = run(&mut shell, "sort cheapest").await;
    assert!(output.contains("cheapest"), "{output}");
}

#[tokio::test]
async fn view_and_book_then_list_sessions() {
    let mut shell = shell(false).await;
    run(&mut shell, REGISTER).await;

    let output = run(&mut shell, "book").await;
    assert!(output.contains("error: select a service"), "{output}");

    let output = run(&mut shell, "view 2").await;
    assert!(output.contains("Tech Resume Review"), "{output}");
    assert!(output.contains("Ryan P."), "{output}");

    let output = run(&mut shell, "book --date 2025-12-01 --time 10:00").await;
    assert!(output.contains("Session added to 'My Sessions'!"), "{output}");
    assert!(
        output.contains("Tech Resume Review with Ryan P. · 2025-12-01 10:00"),
        "{output}"
    );
    assert_eq!(shell.context().ledger.upcoming().len(), 2);

    let output = run(&mut shell, "view 77").await;
    assert!(output.contains("error: service 77 not found"), "{output}");
}

#[tokio::test]
async fn post_rejects_bad_price_and_accepts_valid_service() {
    let mut shell = shell(false).await;
    run(&mut shell, REGISTER).await;

    let output = run(
        &mut shell,
        "post --title 'Mock Loop' --mentor Lee --category 'Mock Interview' --price ten --description 'Full loop'",
    )
    .await;
    assert!(output.contains("error: price must be"), "{output}");
    assert_eq!(shell.context().catalog.len(), 4);

    let output = run(
        &mut shell,
        "post --title 'Mock Loop' --mentor Lee --category 'Mock Interview' --description 'Full loop' --featured",
    )
    .await;
    assert!(output.contains("[5] Mock Loop by Lee"), "{output}");
    assert!(output.contains("Free"), "{output}");
}

#[tokio::test]
async fn profile_edit_and_logout() {
    let mut shell = shell(false).await;
    run(&mut shell, REGISTER).await;

    let output = run(&mut shell, "edit-profile --bio 'Aspiring SWE'").await;
    assert!(output.contains("(MC) Maya Chen"), "{output}");
    assert!(output.contains("Aspiring SWE"), "{output}");
    assert!(output.contains("- Amazon Interview Prep"), "{output}");

    run(&mut shell, "logout").await;
    let output = run(&mut shell, "whoami").await;
    assert!(output.contains("not logged in"), "{output}");
}

#[tokio::test]
async fn json_mode_emits_structured_events() {
    let mut shell = shell(true).await;
    run(&mut shell, REGISTER).await;

    let output = run(&mut shell, "view 1").await;
    let event: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(event["type"], "service_selected");
    assert_eq!(event["payload"]["service"]["title"], "Amazon Interview Prep");

    let output = run(&mut shell, "view 99").await;
    let event: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(event["type"], "error");
    assert_eq!(event["payload"]["code"], "not_found");
}

#[tokio::test]
async fn quit_and_exit_stop_the_loop() {
    let mut shell = shell(false).await;
    let mut out = Vec::new();
    assert_eq!(
        shell.execute("quit", &mut out).await.expect("quit"),
        Flow::Quit
    );
    assert_eq!(
        shell.execute("exit", &mut out).await.expect("exit"),
        Flow::Quit
    );
    assert_eq!(
        shell.execute("", &mut out).await.expect("blank"),
        Flow::Continue
    );
}
