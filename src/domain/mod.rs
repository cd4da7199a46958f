pub mod alert;
pub mod device;
pub mod energy;
pub mod gamification;
pub mod history;
pub mod weather;

pub use alert::*;
pub use device::*;
pub use energy::*;
pub use gamification::*;
pub use history::*;
pub use weather::*;
