use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::Context as _;

use crate::{
    foundation::error::DiagramResult,
    session::interactive::{InteractiveSession, RenderRequest},
    text::TextRenderer,
};

/// One reply line.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Artifact(PathBuf),
    Error(String),
}

/// Drive `session` with one JSON [`RenderRequest`] per input line.
///
/// The session state is written first as a single JSON line, then one [`Reply`] per non-blank
/// request line. Request errors are reported to the client and do not end the loop; only I/O
/// failures on `input`/`output` do. Returns the number of requests answered.
pub fn serve_lines<R: TextRenderer>(
    session: &mut InteractiveSession<R>,
    input: impl BufRead,
    mut output: impl Write,
) -> DiagramResult<usize> {
    write_json_line(&mut output, &session.state())?;

    let mut answered = 0usize;
    for line in input.lines() {
        let line = line.context("read request line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<RenderRequest>(line) {
            Ok(request) => match session.handle(&request) {
                Ok(path) => Reply::Artifact(path),
                Err(err) => {
                    tracing::warn!(%err, "render request failed");
                    Reply::Error(err.to_string())
                }
            },
            Err(err) => Reply::Error(format!("malformed request: {err}")),
        };
        write_json_line(&mut output, &reply)?;
        answered += 1;
    }
    Ok(answered)
}

fn write_json_line(output: &mut impl Write, value: &impl serde::Serialize) -> DiagramResult<()> {
    serde_json::to_writer(&mut *output, value).context("encode reply")?;
    output.write_all(b"\n").context("write reply")?;
    output.flush().context("flush reply")?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/protocol.rs"]
mod tests;
