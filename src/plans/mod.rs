//! Traffic campaigns
//!
//! Each [`CallPlan`] drives one probe worker for the lifetime of a run.
//!
//! | Plan           | Calls | Delay between calls | Expected behavior        |
//! |----------------|-------|---------------------|--------------------------|
//! | `health`       | 10    | 1s                  | always 200               |
//! | `error`        | 5     | 2s                  | always 500               |
//! | `random-error` | 15    | 1.5s                | 500 with probability 0.3 |
//! | `slow`         | 2     | none                | 200 after 10s            |

mod plan;
pub mod registry;

pub use plan::{Behavior, CallPlan, Endpoint};
pub use registry::{PLANS, get_plan, planned};
