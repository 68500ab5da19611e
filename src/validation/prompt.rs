//! # Interactive Acquisition
//!
//! The "ask and validate" loop: prompt for a field value, print each
//! violated rule, and ask again until the value is valid or the input
//! stream ends. This is a cooperative, blocking loop; `None` signals
//! cancellation. The retry is an explicit loop so a pathological stream of
//! invalid input cannot grow the call stack.

use std::io::{self, BufRead, Write};

use super::fields::FieldDef;
use super::schema::{Record, Schema};

/// Asks for one field value until it validates.
///
/// Read-only and hidden fields never solicit input: the current value (or
/// empty) is echoed through unchanged. Returns `Ok(None)` when the input
/// stream is exhausted (user cancelled).
pub fn ask_field<R: BufRead, W: Write>(
    field: &FieldDef,
    current: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<String>> {
    if !field.editable() {
        return Ok(Some(current.unwrap_or("").to_string()));
    }

    loop {
        write!(output, "> {}: ", field.label())?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }
        let value = line.trim_end_matches(['\r', '\n']);

        let errors = field.validate(value);
        if errors.is_empty() {
            return Ok(Some(value.to_string()));
        }
        for message in errors {
            writeln!(output, " :: {message}")?;
        }
    }
}

/// Fills a whole record by asking each field in schema order.
///
/// Defaults supply the echoed value for read-only and hidden fields and are
/// otherwise ignored. Cancellation at any field cancels the whole form.
pub fn fill_form<R: BufRead, W: Write>(
    schema: &Schema,
    defaults: Option<&Record>,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<Record>> {
    let mut record = Record::new();
    for field in schema.fields() {
        let current = defaults.and_then(|d| d.get(field.name())).map(String::as_str);
        match ask_field(field, current, input, output)? {
            Some(value) => {
                record.insert(field.name().to_string(), value);
            }
            None => return Ok(None),
        }
    }
    writeln!(output)?;
    Ok(Some(record))
}
