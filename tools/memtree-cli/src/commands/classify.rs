//! Print the gesture flags of every frame in a recording.

use std::path::PathBuf;

use memtree_common::config::AppConfig;
use memtree_gesture_core::classifier::LandmarkClassifier;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    println!("Classifying frames in: {}", path.display());

    let frames = super::load_frames(&path)?;
    println!("  Loaded {} frames", frames.len());
    println!();

    let classifier = LandmarkClassifier::new(config.classifier.clone());
    let mut active = 0usize;

    for frame in &frames {
        let signal = classifier.classify(frame);
        if signal.is_active {
            active += 1;
            println!(
                "  {:>9.3}s  {:<16} hand=({:.3}, {:.3}) pointer=({:+.3}, {:+.3})",
                frame.timestamp_secs(),
                signal.label(),
                signal.hand_x,
                signal.hand_y,
                signal.pointer_x,
                signal.pointer_y
            );
        } else {
            println!("  {:>9.3}s  {}", frame.timestamp_secs(), signal.label());
        }
    }

    println!();
    println!("Hand visible in {active}/{} frames", frames.len());
    Ok(())
}
