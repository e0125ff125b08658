use super::{ByteStream, LineStream, SessionError};
use futures::stream;
use futures::StreamExt;

struct LineState {
    inner: ByteStream,
    buf: Vec<u8>,
    /// Bytes of `buf` already known to hold no line end.
    scanned: usize,
    /// The last line ended with `\r` at the end of `buf`; a `\n` that
    /// arrives next belongs to it.
    pending_lf: bool,
    exhausted: bool,
}

/// Split a chunked body into lines.
///
/// Lines end at `\n`, `\r\n` or a bare `\r`, also when the pair is split
/// across chunks. Empty lines are kept so SSE framing survives a round trip.
/// Invalid UTF-8 is replaced rather than rejected. A transport error is
/// yielded once and ends the stream.
pub fn split_lines(body: ByteStream) -> LineStream {
    let state = LineState {
        inner: body,
        buf: Vec::new(),
        scanned: 0,
        pending_lf: false,
        exhausted: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if state.pending_lf && !state.buf.is_empty() {
                if state.buf[0] == b'\n' {
                    state.buf.remove(0);
                }
                state.pending_lf = false;
            }

            let end = state.buf[state.scanned..]
                .iter()
                .position(|b| matches!(b, b'\n' | b'\r'));
            if let Some(offset) = end {
                let pos = state.scanned + offset;
                let mut line: Vec<u8> = state.buf.drain(..=pos).collect();
                state.scanned = 0;
                if line.pop() == Some(b'\r') {
                    match state.buf.first() {
                        Some(b'\n') => {
                            state.buf.remove(0);
                        }
                        Some(_) => {}
                        None => state.pending_lf = true,
                    }
                }
                return Some((Ok(decode(line)), state));
            }
            state.scanned = state.buf.len();

            if state.exhausted {
                if state.buf.is_empty() {
                    return None;
                }
                let line = std::mem::take(&mut state.buf);
                state.scanned = 0;
                return Some((Ok(decode(line)), state));
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => state.buf.extend_from_slice(&chunk),
                Some(Err(err)) => {
                    state.exhausted = true;
                    state.buf.clear();
                    state.scanned = 0;
                    return Some((Err::<String, SessionError>(err), state));
                }
                None => state.exhausted = true,
            }
        }
    })
    .boxed()
}

fn decode(line: Vec<u8>) -> String {
    match String::from_utf8(line) {
        Ok(s) => s,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
