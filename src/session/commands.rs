use crate::session::*;

/// One line of operator input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    Event(InputEvent),
    Show,
    Quit,
}

/// Reads a command. Blank lines and lines starting with `#` are skipped.
///
/// Fields can be named by their full dotted path or by their last component.
pub fn parse_command(line: &str, fields: &[FieldPath]) -> EntryResult<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (trimmed, ""),
    };
    let cmd = match word {
        "type" => Command::Event(InputEvent::Text(rest.to_string())),
        "enter" => Command::Event(InputEvent::LineBreak { modified: false }),
        "shift-enter" => Command::Event(InputEvent::LineBreak { modified: true }),
        "focus" => Command::Event(InputEvent::Focus(find_field(rest, fields)?)),
        "submit" => Command::Event(InputEvent::Submit),
        "accept" => Command::Event(InputEvent::Accept),
        "show" => Command::Show,
        "quit" => Command::Quit,
        _ => return UnknownCommandSnafu { line: trimmed }.fail(),
    };
    Ok(Some(cmd))
}

fn find_field(name: &str, fields: &[FieldPath]) -> EntryResult<FieldPath> {
    fields
        .iter()
        .find(|f| f.as_str() == name || f.name() == name)
        .cloned()
        .context(UnknownFieldSnafu { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_entry::fields::FormSection;

    #[test]
    fn commands() {
        let fields = FormSection::Differences.fields();
        let p = |s: &str| parse_command(s, &fields).unwrap();
        assert_eq!(p(""), None);
        assert_eq!(p("# a comment"), None);
        assert_eq!(
            p("type 12 345"),
            Some(Command::Event(InputEvent::Text("12 345".to_string())))
        );
        assert_eq!(
            p("type"),
            Some(Command::Event(InputEvent::Text("".to_string())))
        );
        assert_eq!(
            p("  shift-enter "),
            Some(Command::Event(InputEvent::LineBreak { modified: true }))
        );
        assert_eq!(
            p("enter"),
            Some(Command::Event(InputEvent::LineBreak { modified: false }))
        );
        assert_eq!(p("quit"), Some(Command::Quit));
    }

    #[test]
    fn focus_by_short_or_long_name() {
        let fields = FormSection::Differences.fields();
        let expected = Some(Command::Event(InputEvent::Focus(FieldPath::from(
            "data.differences_counts.other_explanation_count",
        ))));
        assert_eq!(
            parse_command("focus other_explanation_count", &fields).unwrap(),
            expected
        );
        assert_eq!(
            parse_command(
                "focus data.differences_counts.other_explanation_count",
                &fields
            )
            .unwrap(),
            expected
        );
        assert!(matches!(
            parse_command("focus poll_card_count", &fields),
            Err(EntryError::UnknownField { .. })
        ));
        assert!(matches!(
            parse_command("jump", &fields),
            Err(EntryError::UnknownCommand { .. })
        ));
    }
}
