use const_format;

pub enum Accelerators {
    Quit,
    TogglePlayPause,
    ToggleMute,
    ForcePlay,
    DividerLeft,
    DividerRight,
    DumpPipeline,
}

#[macro_export]
#[cfg(target_os = "macos")]
macro_rules! action_accelerator_with_os_modifier {
    ($accelerator:expr) => {
        const_format::formatcp!("<Meta>{}", $accelerator)
    };
}

#[macro_export]
#[cfg(not(target_os = "macos"))]
macro_rules! action_accelerator_with_os_modifier {
    ($accelerator:expr) => {
        const_format::formatcp!("<Primary>{}", $accelerator)
    };
}

/// Step in percent the divider moves per keyboard accelerator.
pub const DIVIDER_KEY_STEP: f64 = 5.0;

// The syntax of the accelerators and the modifiers is described here:
// https://gtk-rs.org/gtk4-rs/stable/latest/docs/gtk4/fn.accelerator_parse.html
//
// NOTE: Always pay attention to lower and upper names, for example 'space' vs 'Left'.
pub fn accelerators(accel: Accelerators) -> Vec<&'static str> {
    match accel {
        Accelerators::Quit => vec![action_accelerator_with_os_modifier!("Q")],
        Accelerators::TogglePlayPause => vec!["space", "AudioPlay"],
        Accelerators::ToggleMute => vec!["m", "AudioMute"],
        Accelerators::ForcePlay => vec![action_accelerator_with_os_modifier!("P")],
        Accelerators::DividerLeft => vec![action_accelerator_with_os_modifier!("Left")],
        Accelerators::DividerRight => vec![action_accelerator_with_os_modifier!("Right")],
        Accelerators::DumpPipeline => vec![action_accelerator_with_os_modifier!("D")],
    }
}
