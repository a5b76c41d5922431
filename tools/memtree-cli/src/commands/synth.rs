//! Generate scripted hand-landmark recordings.

use std::io::Write;
use std::path::PathBuf;

use clap::ValueEnum;
use memtree_gesture_model::frame::HandFrame;
use memtree_gesture_model::pose::{HandPose, PoseScript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Open palm swept toward the left edge: advances one item
    SwipeLeft,
    /// Open palm swept toward the right edge: goes back one item
    SwipeRight,
    /// OK held, then released: focuses then advances one item
    OkRelease,
    /// Open palm then fist: explodes, then gathers the tree
    Fist,
    /// Index pointing, then relaxed: approaches, then idles
    Point,
    /// OK held, hand leaves the frame, then returns relaxed: the pending release still fires
    LostHand,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Scenario::SwipeLeft => "swipe-left",
            Scenario::SwipeRight => "swipe-right",
            Scenario::OkRelease => "ok-release",
            Scenario::Fist => "fist",
            Scenario::Point => "point",
            Scenario::LostHand => "lost-hand",
        }
    }

    pub fn frames(self) -> Vec<HandFrame> {
        let script = PoseScript::default().hold(HandPose::Relaxed, 0.5, 5);
        let script = match self {
            Scenario::SwipeLeft => script.sweep(0.75, 0.25, 10).hold(HandPose::OpenPalm, 0.25, 5),
            Scenario::SwipeRight => script.sweep(0.25, 0.75, 10).hold(HandPose::OpenPalm, 0.75, 5),
            Scenario::OkRelease => script
                .hold(HandPose::Ok, 0.5, 20)
                .hold(HandPose::Relaxed, 0.5, 10),
            Scenario::Fist => script
                .hold(HandPose::OpenPalm, 0.5, 10)
                .hold(HandPose::Fist, 0.5, 60)
                .hold(HandPose::Relaxed, 0.5, 5),
            Scenario::Point => script
                .hold(HandPose::Pointing, 0.5, 30)
                .hold(HandPose::Relaxed, 0.5, 10),
            Scenario::LostHand => script
                .hold(HandPose::Ok, 0.5, 15)
                .lost(10)
                .hold(HandPose::Relaxed, 0.5, 10),
        };
        script.into_frames()
    }
}

pub fn run(scenario: Scenario, output: PathBuf) -> anyhow::Result<()> {
    let frames = scenario.frames();

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(&output)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", output.display()))?;
    let mut writer = std::io::BufWriter::new(file);

    let header = serde_json::json!({
        "generator": "memtree synth",
        "scenario": scenario.name(),
        "frames": frames.len(),
    });
    writeln!(writer, "# {header}")?;
    for frame in &frames {
        writeln!(writer, "{}", serde_json::to_string(frame)?)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} frames ({}) to: {}",
        frames.len(),
        scenario.name(),
        output.display()
    );
    Ok(())
}
