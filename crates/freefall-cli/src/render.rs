//! Presentation: the animated ASCII track with telemetry, or JSON lines.

use std::fmt::Write as _;
use std::io::{self, Write};

use freefall_sim::{RenderFrame, RunSummary, Telemetry, Tick};
use serde::Serialize;

const CLEAR: &str = "\x1b[2J\x1b[H";
const GROUND: &str = "------ Ground ------";

/// Consumer of everything a session produces.
pub trait Presenter {
    fn header(&mut self) -> io::Result<()>;
    /// `index` is 1-based.
    fn begin_object(&mut self, index: usize) -> io::Result<()>;
    fn frame(&mut self, tick: &Tick) -> io::Result<()>;
    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Draw `rows` lines with the body at `frame.current_index` and faded trail
/// markers, then the ground line.
pub fn draw_track(frame: &RenderFrame, rows: usize, ansi: bool) -> String {
    let (object, trail) = if ansi {
        ("   \x1b[1;32m*\x1b[0m   <-- object", "   \x1b[0;90mo\x1b[0m")
    } else {
        ("   *   <-- object", "   o")
    };

    let mut out = String::new();
    for row in 0..rows {
        if row == frame.current_index {
            out.push_str(object);
        } else if frame.trail.contains(&row) {
            out.push_str(trail);
        }
        out.push('\n');
    }
    out.push_str(GROUND);
    out.push('\n');
    out
}

pub fn format_telemetry(t: &Telemetry) -> String {
    let mut out = String::new();
    // writing to a String cannot fail
    let _ = write!(
        out,
        "Time: {:.2} s\tVelocity: {:.2} m/s\tHeight: {:.2} m\tDrag: {:.2} N\tWind: {:.2} N (Direction: {})\n\
         Air Density: {:.2} kg/m³\n",
        t.elapsed_time,
        t.velocity,
        t.position,
        t.drag_force,
        t.wind_force,
        t.wind_direction.label(),
        t.air_density,
    );
    out
}

/// Terminal animation. With `ansi` off, frames are appended instead of
/// redrawn and markers carry no colour.
pub struct Console<W> {
    out: W,
    rows: usize,
    ansi: bool,
}

impl<W: Write> Console<W> {
    pub fn new(out: W, rows: usize, ansi: bool) -> Self {
        Self { out, rows, ansi }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for Console<W> {
    fn header(&mut self) -> io::Result<()> {
        if self.ansi {
            write!(self.out, "{CLEAR}\x1b[1;34mPhysics Object Simulation\x1b[0m\n")?;
        } else {
            writeln!(self.out, "Physics Object Simulation")?;
        }
        writeln!(self.out, "---------------------------")?;
        self.out.flush()
    }

    fn begin_object(&mut self, index: usize) -> io::Result<()> {
        write!(self.out, "\nObject {index}:\n")?;
        self.out.flush()
    }

    fn frame(&mut self, tick: &Tick) -> io::Result<()> {
        if self.ansi {
            self.out.write_all(CLEAR.as_bytes())?;
        }
        self.out.write_all(draw_track(&tick.frame, self.rows, self.ansi).as_bytes())?;
        self.out.write_all(format_telemetry(&tick.telemetry).as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        let line = format!("Simulation complete! Total time: {:.2} seconds.", summary.elapsed_time);
        if self.ansi {
            write!(self.out, "\n\x1b[1;33m{line}\x1b[0m\n")?;
        } else {
            write!(self.out, "\n{line}\n")?;
        }
        if !summary.settled {
            writeln!(self.out, "Stopped after {} ticks without settling.", summary.ticks)?;
        }
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Object { object: usize },
    Tick { object: usize, tick: &'a Tick },
    Summary { object: usize, summary: &'a RunSummary },
}

/// One JSON object per line, for piping into other tools.
pub struct JsonLines<W> {
    out: W,
    object: usize,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out, object: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write> Presenter for JsonLines<W> {
    fn header(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn begin_object(&mut self, index: usize) -> io::Result<()> {
        self.object = index;
        self.emit(&Record::Object { object: index })
    }

    fn frame(&mut self, tick: &Tick) -> io::Result<()> {
        self.emit(&Record::Tick { object: self.object, tick })
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.emit(&Record::Summary { object: self.object, summary })?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freefall_core::WindDirection;
    use freefall_sim::Contact;

    fn telemetry() -> Telemetry {
        Telemetry {
            elapsed_time: 1.25,
            velocity: 9.876,
            position: 3.3333,
            drag_force: 0.1234,
            wind_force: -0.4,
            wind_direction: WindDirection::Left,
            air_density: 1.2246,
        }
    }

    fn tick() -> Tick {
        Tick {
            telemetry: telemetry(),
            frame: RenderFrame { trail: vec![1, 2, 3], current_index: 3 },
            contact: Contact::Airborne,
            drag_coefficient: 0.47,
        }
    }

    #[test]
    fn plain_track_marks_object_and_trail() {
        let frame = RenderFrame { trail: vec![0, 2, 4], current_index: 4 };
        let drawn = draw_track(&frame, 6, false);
        let lines: Vec<&str> = drawn.lines().collect();
        assert_eq!(
            lines,
            vec!["   o", "", "   o", "", "   *   <-- object", "", "------ Ground ------"]
        );
    }

    #[test]
    fn ansi_track_colours_markers() {
        let frame = RenderFrame { trail: vec![0, 1], current_index: 1 };
        let drawn = draw_track(&frame, 20, true);
        assert_eq!(drawn.lines().count(), 21);
        assert!(drawn.starts_with("   \x1b[0;90mo\x1b[0m\n   \x1b[1;32m*\x1b[0m   <-- object\n"));
    }

    #[test]
    fn telemetry_has_two_decimals() {
        assert_eq!(
            format_telemetry(&telemetry()),
            "Time: 1.25 s\tVelocity: 9.88 m/s\tHeight: 3.33 m\tDrag: 0.12 N\tWind: -0.40 N (Direction: Left)\n\
             Air Density: 1.22 kg/m³\n"
        );
    }

    #[test]
    fn console_frame_and_summary() {
        let mut console = Console::new(Vec::new(), 4, false);
        console.header().unwrap();
        console.begin_object(1).unwrap();
        console.frame(&tick()).unwrap();
        console
            .finish(&RunSummary { ticks: 3, elapsed_time: 0.15, bounces: 0, max_speed: 1.0, settled: true })
            .unwrap();

        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.starts_with("Physics Object Simulation\n---------------------------\n"));
        assert!(text.contains("\nObject 1:\n"));
        assert!(text.contains("   *   <-- object\n------ Ground ------\nTime: 1.25 s"));
        assert!(text.ends_with("\nSimulation complete! Total time: 0.15 seconds.\n"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn console_notes_unsettled_runs() {
        let mut console = Console::new(Vec::new(), 5, true);
        console
            .finish(&RunSummary { ticks: 42, elapsed_time: 2.1, bounces: 0, max_speed: 1.0, settled: false })
            .unwrap();
        let text = String::from_utf8(console.into_inner()).unwrap();
        assert!(text.contains("\x1b[1;33mSimulation complete! Total time: 2.10 seconds.\x1b[0m"));
        assert!(text.contains("Stopped after 42 ticks without settling."));
    }

    #[test]
    fn json_lines_are_tagged() {
        let mut json = JsonLines::new(Vec::new());
        json.header().unwrap();
        json.begin_object(2).unwrap();
        json.frame(&tick()).unwrap();
        json.finish(&RunSummary { ticks: 1, elapsed_time: 0.05, bounces: 0, max_speed: 0.5, settled: true })
            .unwrap();

        let text = String::from_utf8(json.into_inner()).unwrap();
        let records: Vec<serde_json::Value> =
            text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["event"], "object");
        assert_eq!(records[1]["event"], "tick");
        assert_eq!(records[1]["object"], 2);
        assert_eq!(records[1]["tick"]["telemetry"]["wind_direction"], "Left");
        assert_eq!(records[1]["tick"]["frame"]["current_index"], 3);
        assert_eq!(records[1]["tick"]["contact"]["kind"], "airborne");
        assert_eq!(records[2]["summary"]["settled"], true);
    }
}
