//! Encode argument construction.

use crate::planner::EncodeParameters;

/// Build the engine argument vector for one compression invocation.
///
/// The sequence mirrors the reference invocation: decode input, re-encode
/// video as H.264 under the planned rate controls, re-encode audio as AAC,
/// cap the output height, use the speed-oriented preset, and lay the file
/// out for progressive download. `-nostdin` leads so a spawned engine never
/// waits on a terminal.
pub fn build_encode_args(
    input_path: &str,
    output_path: &str,
    params: &EncodeParameters,
) -> Vec<String> {
    log::debug!(
        target: "fitclip::ffmpeg::builder",
        "Building FFmpeg command: crf={}, v={}k, a={}k, height<={}, input={} -> output={}",
        params.crf,
        params.video_bitrate_kbps,
        params.audio_bitrate_kbps,
        params.scale_height,
        input_path,
        output_path
    );

    vec![
        "-nostdin".to_string(),
        "-i".to_string(),
        input_path.to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        params.crf.to_string(),
        "-b:v".to_string(),
        format!("{}k", params.video_bitrate_kbps),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        format!("{}k", params.audio_bitrate_kbps),
        "-vf".to_string(),
        params.scale_filter(),
        "-preset".to_string(),
        "fast".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        output_path.to_string(),
    ]
}

/// Formats args for readable display: option and value on the same line when
/// the next arg is a value.
pub fn format_args_for_display_multiline(args: &[String]) -> String {
    let mut lines = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if arg.starts_with('-') && i + 1 < args.len() && !args[i + 1].starts_with('-') {
            lines.push(format!("  {} {}", arg, args[i + 1]));
            i += 2;
        } else {
            lines.push(format!("  {}", arg));
            i += 1;
        }
    }
    lines.join("\n")
}
