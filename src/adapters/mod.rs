//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements             | Connects to               |
//! |--------------|------------------------|---------------------------|
//! | `console`    | AlertPort, DialerPort  | `log` output, fake phone  |
//! | `json_sink`  | EventSink              | any `io::Write`, JSON lines |
//! | `log_sink`   | EventSink              | `log` output              |

pub mod console;
pub mod json_sink;
pub mod log_sink;
