//! Terminal output formatter

use agentrag_core::{Answer, Origin, TextFragment};
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

const PREVIEW_LINES: usize = 5;

pub fn write_answer<W: WriteColor>(out: &mut W, answer: &Answer) -> io::Result<()> {
    writeln!(out, "{}", answer.text.trim_end())?;

    if !answer.cited_sources.is_empty() {
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        writeln!(out, "Sources:")?;
        out.reset()?;
        for source in &answer.cited_sources {
            writeln!(out, "  - {}", source)?;
        }
    }

    if !answer.grounded {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        writeln!(out, "(not grounded in the provided sources)")?;
        out.reset()?;
    }

    Ok(())
}

pub fn write_fragments<W: WriteColor>(out: &mut W, fragments: &[TextFragment]) -> io::Result<()> {
    if fragments.is_empty() {
        writeln!(out, "No matching passages.")?;
        return Ok(());
    }

    for (i, fragment) in fragments.iter().enumerate() {
        let origin = match fragment.origin {
            Origin::Local => "local",
            Origin::Web => "web",
        };
        let score = fragment
            .relevance_score
            .map(|s| format!("{:>3}%", (s * 100.0).round() as i32))
            .unwrap_or_else(|| "  - ".to_string());

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(out, "{} ", score)?;
        out.reset()?;
        writeln!(out, "[{}] {} ({})", i + 1, fragment.source_id, origin)?;

        let lines: Vec<&str> = fragment.text.lines().filter(|l| !l.trim().is_empty()).collect();
        for line in lines.iter().take(PREVIEW_LINES) {
            writeln!(out, "    {}", line.trim())?;
        }
        if lines.len() > PREVIEW_LINES {
            writeln!(out, "    ...")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use termcolor::NoColor;

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut NoColor<Vec<u8>>) -> io::Result<()>,
    {
        let mut out = NoColor::new(Vec::new());
        f(&mut out).unwrap();
        String::from_utf8(out.into_inner()).unwrap()
    }

    #[test]
    fn test_grounded_answer_lists_sources() {
        let answer = Answer {
            text: "Paris [1].".into(),
            cited_sources: BTreeSet::from(["wikipedia:Paris".to_string()]),
            grounded: true,
        };
        let text = render(|out| write_answer(out, &answer));
        assert!(text.starts_with("Paris [1].\n"));
        assert!(text.contains("  - wikipedia:Paris"));
        assert!(!text.contains("not grounded"));
    }

    #[test]
    fn test_ungrounded_answer_is_flagged() {
        let answer = Answer {
            text: "No supporting evidence.".into(),
            cited_sources: BTreeSet::new(),
            grounded: false,
        };
        let text = render(|out| write_answer(out, &answer));
        assert!(!text.contains("Sources:"));
        assert!(text.contains("not grounded"));
    }

    #[test]
    fn test_fragments_preview() {
        let long = (1..=8).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let fragments = vec![TextFragment::local(long, "notes.txt", 0.42)];
        let text = render(|out| write_fragments(out, &fragments));
        assert!(text.contains(" 42% [1] notes.txt (local)"));
        assert!(text.contains("    line 5"));
        assert!(!text.contains("line 6"));
        assert!(text.contains("    ..."));
    }

    #[test]
    fn test_no_fragments() {
        assert_eq!(render(|out| write_fragments(out, &[])), "No matching passages.\n");
    }
}
