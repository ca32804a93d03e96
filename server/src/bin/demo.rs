//! TodoFlow Demo
//!
//! Walks through the todo workflow against the in-memory store:
//! - Creating todos for two users
//! - Toggling, editing and deleting
//! - Ownership checks between users
//! - Filtered views and dashboard stats
//! - Change notifications for the live list
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin demo
//! ```

use std::sync::Arc;
use todoflow_core::{
    Caller, InMemoryTodoStore, NewTodo, Priority, StatusFilter, TodoEnvironment, TodoFilter,
    TodoPatch, TodoService, TodoStats, UserId,
};
use todoflow_server::telemetry;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    println!("\n📝 ============================================");
    println!("   TodoFlow - Live Demo");
    println!("============================================\n");

    let service = TodoService::new(Arc::new(InMemoryTodoStore::new()), TodoEnvironment::default());
    let alice = Caller::User(UserId::from_uuid(Uuid::new_v4()));
    let bob = Caller::User(UserId::from_uuid(Uuid::new_v4()));

    let mut changes = service
        .watch(&alice)
        .await
        .ok_or_else(|| anyhow::anyhow!("authenticated caller could not watch"))?;

    // Step 1: Alice adds todos
    println!("1️⃣  Alice adds three todos...");
    let milk = service
        .create(&alice, NewTodo::new("Buy milk", Priority::Low))
        .await?;
    service
        .create(&alice, NewTodo::new("File taxes", Priority::High))
        .await?;
    service
        .create(&alice, NewTodo::new("Call the plumber", Priority::Medium))
        .await?;
    for todo in service.list(&alice).await? {
        println!("   • [{}] {} ({})", mark(todo.completed), todo.text, todo.priority);
    }
    println!();

    // Step 2: Alice completes and renames one
    println!("2️⃣  Alice completes \"Buy milk\" and renames it...");
    let toggled = service.toggle(&alice, milk).await?;
    println!("   ✓ completed = {}", toggled.completed);
    let updated = service
        .update(
            &alice,
            milk,
            TodoPatch {
                text: Some("Buy oat milk".to_string()),
                ..TodoPatch::default()
            },
        )
        .await?;
    println!("   ✓ text = {:?}\n", updated.text);

    // Step 3: Bob cannot touch Alice's todos
    println!("3️⃣  Bob tries to delete Alice's todo...");
    match service.remove(&bob, milk).await {
        Ok(()) => println!("   ✗ Unexpectedly succeeded"),
        Err(e) => println!("   ✓ Rejected: {e}"),
    }
    println!("   ✓ Bob sees {} todos\n", service.list(&bob).await?.len());

    // Step 4: Anonymous callers
    println!("4️⃣  An anonymous visitor...");
    println!(
        "   ✓ Sees {} todos",
        service.list(&Caller::Anonymous).await?.len()
    );
    match service
        .create(&Caller::Anonymous, NewTodo::new("spam", Priority::Low))
        .await
    {
        Ok(_) => println!("   ✗ Unexpectedly created a todo"),
        Err(e) => println!("   ✓ Create rejected: {e}\n"),
    }

    // Step 5: Dashboard
    println!("5️⃣  Alice's dashboard...");
    let all = service.list(&alice).await?;
    let stats = TodoStats::from_todos(&all);
    println!(
        "   Total: {}  Completed: {}  Remaining: {}",
        stats.total, stats.completed, stats.remaining
    );
    let active = TodoFilter {
        status: StatusFilter::Active,
        ..TodoFilter::default()
    };
    for todo in active.apply(all) {
        println!("   • active: {}", todo.text);
    }
    println!();

    // Step 6: Cleanup
    println!("6️⃣  Alice deletes \"Buy oat milk\"...");
    service.remove(&alice, milk).await?;
    println!("   ✓ {} todos left\n", service.list(&alice).await?.len());

    // Live list notifications
    println!("📡 Changes Alice's live list was notified of:");
    while let Ok(change) = changes.try_recv() {
        println!("   • {change:?}");
    }

    println!("\n============================================");
    println!("   Demo complete");
    println!("============================================\n");

    Ok(())
}

const fn mark(completed: bool) -> &'static str {
    if completed { "x" } else { " " }
}
