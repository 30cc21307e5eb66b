//! Payselect Demo Entry Point
//!
//! Wires the client core to an in-process backend over a seeded in-memory
//! dataset and walks one selection through its whole life: browse, select,
//! refine, apply.

use std::sync::Arc;

use payselect::api::SelectionApi;
use payselect::bridge::InProcessApi;
use payselect::models::{Mode, PaymentFilter, SelectionDelta, SortDir, SortKey};
use payselect::session::SelectionSession;
use payselect::sync::SyncConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) =
        rolling_logger::init_logger(std::env::temp_dir().join("payselect-logs"), "payselect")
    {
        eprintln!("logger init failed ({}), continuing without file logs", e);
    }

    let state = Arc::new(payselect_server::init_memory()?);
    payselect_server::repository::seed_demo_payments(&state.conn, 1000, "2024-09-01".parse()?)
        .await?;
    let api: Arc<dyn SelectionApi> = Arc::new(InProcessApi::new(state));

    let filter = PaymentFilter::default();
    let page = api
        .search_payments(filter.clone(), 0, 10, SortKey::Id, SortDir::Asc)
        .await?;
    println!(
        "page 1/{}, {} payments match the filter",
        page.total_pages, page.total_elements
    );
    for p in &page.content {
        println!(
            "  {:<10} {:<30} {:>9.2}  due {}  {}",
            p.id,
            p.description,
            p.amount,
            p.due_date,
            p.status.as_str()
        );
    }

    let session =
        SelectionSession::create(api.clone(), filter, Mode::None, SyncConfig::default()).await?;
    let selection_id = session.id().to_string();
    println!("selection {} created", selection_id);

    session.toggle("item-5").await;
    session.settle().await?;
    println!("toggled item-5 on      -> {} selected", session.selected_count().await);

    session.select_all().await;
    session.settle().await?;
    println!("select all (filtered)  -> {} selected", session.selected_count().await);

    session.toggle("item-5").await;
    session.settle().await?;
    println!("excluded item-5        -> {} selected", session.selected_count().await);

    match session.apply("PAY").await {
        Ok(()) => println!("bulk PAY applied, selection released"),
        Err(err) => println!("apply failed: {}", err.error),
    }

    // The id was single-use; the backend has forgotten it
    match api.update_selection(&selection_id, SelectionDelta::default()).await {
        Ok(_) => println!("unexpected: released id still answers"),
        Err(e) => println!("update on released id -> {}", e),
    }

    Ok(())
}
