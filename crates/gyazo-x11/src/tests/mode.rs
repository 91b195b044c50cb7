use crate::CaptureMode;

/// WHAT: The mode comes from the basename of the program path
/// WHY: One binary is installed under several names
#[test]
fn given_program_path_when_detecting_then_basename_selects_mode() {
    // Given/When: Program invoked through symlinks with different names
    let gif = CaptureMode::detect(Some("/usr/local/bin/gyazogif"), "gyazo");
    let gifzo = CaptureMode::detect(Some("gifzo"), "gyazo");

    // Then: The name decides
    assert_eq!(gif, CaptureMode::GyazoGif);
    assert_eq!(gifzo, CaptureMode::Gifzo);
}

/// WHAT: Unknown program names fall back to the configured default
/// WHY: The binary may be installed under any name
#[test]
fn given_unknown_program_name_when_detecting_then_default_mode_used() {
    // Given/When: A name that is not a mode
    let mode = CaptureMode::detect(Some("/opt/bin/gyazo-x11"), "gifzo");
    let without_argv = CaptureMode::detect(None, "gyazogif");

    // Then: Configured default wins
    assert_eq!(mode, CaptureMode::Gifzo);
    assert_eq!(without_argv, CaptureMode::GyazoGif);
}

/// WHAT: An unknown default mode falls back to still capture
/// WHY: A typo in the config must not stop the tool from working
#[test]
fn given_unknown_default_when_detecting_then_gyazo_used() {
    // Given/When: Neither name nor default is a mode
    let mode = CaptureMode::detect(Some("capture"), "gyazo-video");

    // Then: Still capture
    assert_eq!(mode, CaptureMode::Gyazo);
}

/// WHAT: Each mode carries its service's upload parameters
/// WHY: The services expect specific field names and filenames
#[test]
fn given_modes_when_reading_upload_parameters_then_service_specific() {
    // Given/When/Then: Still upload to gyazo.com
    let still = CaptureMode::Gyazo;
    assert_eq!(still.endpoint(), "http://gyazo.com/upload.cgi");
    assert_eq!(still.field_name(), "imagedata");
    assert_eq!(still.upload_filename(), "gyazo.com");
    assert!(still.user_agent().starts_with("Gyazo2.0Linux/"));
    assert!(!still.is_video());
    assert_eq!(still.file_suffix(), ".png");

    // Given/When/Then: Video uploads
    let gif = CaptureMode::GyazoGif;
    assert_eq!(gif.endpoint(), "http://gif.gyazo.com/");
    assert_eq!(gif.field_name(), "data");
    assert_eq!(gif.upload_filename(), "gyazo.mp4");
    assert!(gif.user_agent().starts_with("Gyazo-GIFLinux/"));
    assert!(gif.is_video());

    let gifzo = CaptureMode::Gifzo;
    assert_eq!(gifzo.endpoint(), "http://gifzo.net/");
    assert_eq!(gifzo.upload_filename(), "gifzo.mp4");
    assert_eq!(gifzo.file_suffix(), ".mp4");
}

/// WHAT: Only the gyazo services use the persisted user ID
/// WHY: gifzo has no notion of a Gyazo user
#[test]
fn given_modes_when_checking_gyazo_id_then_only_gyazo_services() {
    // Given/When/Then
    assert!(CaptureMode::Gyazo.uses_gyazo_id());
    assert!(CaptureMode::GyazoGif.uses_gyazo_id());
    assert!(!CaptureMode::Gifzo.uses_gyazo_id());
}
