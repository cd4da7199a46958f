//! Load test runner.
//!
//! ```bash
//! cargo test --test load_tests -- --ignored --test-threads=1
//! ```
//!
//! Load tests are `#[ignore]`d so normal test runs stay fast.

mod load;
