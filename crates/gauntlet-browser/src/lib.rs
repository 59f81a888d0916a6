mod capabilities;
mod error;
mod factory;
mod handle;
mod headless;
mod webdriver;

pub use error::{Error, Result};
pub use factory::GauntletDriverFactory;
pub use handle::{DriverFactory, DriverHandle};
pub use headless::{EmulatedBrowser, HeadlessSession};
pub use webdriver::WebDriverSession;
