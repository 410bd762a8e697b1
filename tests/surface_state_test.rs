use mxl_comparison_player::surface::PlaybackState;

#[test]
fn first_report_is_applied() {
    assert_eq!(
        PlaybackState::transition(None, PlaybackState::Stopped),
        Some(PlaybackState::Stopped)
    );
}

#[test]
fn repeated_report_is_ignored() {
    assert_eq!(PlaybackState::transition(Some(PlaybackState::Playing), PlaybackState::Playing), None);
}

#[test]
fn error_survives_pipeline_stop() {
    assert_eq!(PlaybackState::transition(Some(PlaybackState::Error), PlaybackState::Stopped), None);
    assert_eq!(
        PlaybackState::transition(Some(PlaybackState::Playing), PlaybackState::Error),
        Some(PlaybackState::Error)
    );
}

#[test]
fn playback_leaves_error() {
    assert_eq!(
        PlaybackState::transition(Some(PlaybackState::Error), PlaybackState::Playing),
        Some(PlaybackState::Playing)
    );
    assert_eq!(
        PlaybackState::transition(Some(PlaybackState::Error), PlaybackState::Buffering),
        Some(PlaybackState::Buffering)
    );
}
