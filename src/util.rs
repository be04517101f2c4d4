use std::borrow::Cow;

/// Quotes a field per RFC 4180: commas, quotes and line breaks trigger
/// quoting, embedded quotes are doubled.
pub fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn csv_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through_unquoted() {
        assert_eq!(csv_field("Dana Voss"), "Dana Voss");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn commas_and_newlines_trigger_quoting() {
        assert_eq!(csv_field("Voss, Dana"), "\"Voss, Dana\"");
        assert_eq!(csv_field("line one\nline two"), "\"line one\nline two\"");
        assert_eq!(csv_field("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        assert_eq!(csv_field("the \"fixer\""), "\"the \"\"fixer\"\"\"");
    }

    #[test]
    fn rows_join_fields_and_terminate() {
        assert_eq!(csv_row(&["a", "b,c", "d"]), "a,\"b,c\",d\n");
    }
}
