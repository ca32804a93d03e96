//! # TodoFlow Testing
//!
//! Testing utilities for TodoFlow.
//!
//! This crate provides:
//! - Deterministic clocks for the service environment
//! - Well-known users and sample records
//! - proptest strategies for domain types
//!
//! ## Example
//!
//! ```ignore
//! use todoflow_testing::{alice, test_environment};
//!
//! #[tokio::test]
//! async fn create_then_list() {
//!     let service = TodoService::new(Arc::new(InMemoryTodoStore::new()), test_environment());
//!     let caller = Caller::User(alice());
//!
//!     service.create(&caller, NewTodo::new("Buy milk", Priority::Low)).await.unwrap();
//!
//!     assert_eq!(service.list(&caller).await.unwrap().len(), 1);
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use todoflow_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use todoflow_testing::mocks::FixedClock;
    /// use todoflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read.
    ///
    /// Gives each created todo a distinct, increasing timestamp.
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        step_ms: i64,
        ticks: AtomicI64,
    }

    impl SteppingClock {
        /// Start at `start`, advancing `step` per call to `now`.
        #[must_use]
        pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                start,
                step_ms: step.num_milliseconds(),
                ticks: AtomicI64::new(0),
            }
        }
    }

    impl Default for SteppingClock {
        fn default() -> Self {
            Self::new(test_clock().now(), Duration::seconds(1))
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
            self.start + Duration::milliseconds(tick * self.step_ms)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::milliseconds(1_735_689_600_000))
    }
}

/// Well-known users and sample records.
pub mod fixtures {
    use std::sync::Arc;
    use todoflow_core::{NewTodo, Priority, Todo, TodoEnvironment, TodoId, UserId};
    use uuid::Uuid;

    use super::mocks::test_clock;
    use super::Clock;

    /// First test user.
    #[must_use]
    pub const fn alice() -> UserId {
        UserId(Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_a11c))
    }

    /// Second test user.
    #[must_use]
    pub const fn bob() -> UserId {
        UserId(Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0b0b))
    }

    /// An open todo owned by `owner`, created at [`test_clock`] time.
    #[must_use]
    pub fn sample_todo(owner: UserId, text: &str, priority: Priority) -> Todo {
        Todo::new(
            TodoId::new(),
            owner,
            NewTodo::new(text, priority),
            test_clock().now(),
        )
    }

    /// Service environment driven by [`test_clock`].
    #[must_use]
    pub fn test_environment() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_clock()))
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use todoflow_core::{NewTodo, Priority, TodoPatch};

    /// Any priority.
    pub fn priority() -> impl Strategy<Value = Priority> {
        prop_oneof![
            Just(Priority::Low),
            Just(Priority::Medium),
            Just(Priority::High)
        ]
    }

    /// Todo text, including the empty string.
    pub fn todo_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{0,40}"
    }

    /// A create input with an optional due date.
    pub fn new_todo() -> impl Strategy<Value = NewTodo> {
        (
            todo_text(),
            priority(),
            proptest::option::of(0_i64..4_102_444_800_000),
        )
            .prop_map(|(text, priority, due_date)| NewTodo {
                text,
                priority,
                due_date,
            })
    }

    /// A partial update where each field is independently present.
    pub fn patch() -> impl Strategy<Value = TodoPatch> {
        (
            proptest::option::of(todo_text()),
            proptest::option::of(priority()),
            proptest::option::of(0_i64..4_102_444_800_000),
        )
            .prop_map(|(text, priority, due_date)| TodoPatch {
                text,
                priority,
                due_date,
            })
    }
}

/// Install a test-writer tracing subscriber once per process.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init()
        .ok();
}

// Re-export commonly used items
pub use fixtures::{alice, bob, sample_todo, test_environment};
pub use mocks::{FixedClock, SteppingClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_is_new_year_2025() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn stepping_clock_strictly_increases() {
        let clock = SteppingClock::default();
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, Duration::seconds(1));
    }

    #[test]
    fn fixture_users_differ() {
        assert_ne!(alice(), bob());
    }
}
