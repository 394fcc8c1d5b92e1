// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod charts;
mod config;
mod curve;
mod error;
mod face;
mod fuzzy_time;
mod markers;
mod slider;
mod spring;
mod synth;
mod trend;
mod ui;
mod zones;

use app::Sweetie;
use iced::Theme;

fn main() -> iced::Result {
    // On Windows, force wgpu to use Vulkan backend instead of DirectX 12
    #[cfg(target_os = "windows")]
    std::env::set_var("WGPU_BACKEND", "vulkan");

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Sweetie", Sweetie::update, Sweetie::view)
        .subscription(Sweetie::subscription)
        .theme(|_| Theme::Dark)
        .window_size((420.0, 540.0))
        .run_with(Sweetie::new)
}
