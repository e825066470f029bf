pub mod headless;

pub use headless::{launch_headless_browser, ChromeLauncher, ChromeSession};
