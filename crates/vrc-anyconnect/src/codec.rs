//! Tokio codecs for the client's interactive stdin/stdout

use std::fmt;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ResponseError;
use crate::groups::GROUP_PROMPT;

/// Combine group and username into the token the client reads at its
/// username prompt.
///
/// The client asks for the group first when the server offers groups, so the
/// group answer is sent on the line before the username.
pub fn login_token(group: &str, username: &str) -> String {
    format!("{}\n{}", group, username)
}

/// A command script for the client's `-s` (stdin) mode
#[derive(Clone)]
pub enum ScriptCommand {
    /// Connect and answer the login prompts
    Connect {
        server: String,
        group: String,
        username: String,
        password: String,
    },
    /// Tear down the current tunnel
    Disconnect,
}

impl fmt::Debug for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect {
                server,
                group,
                username,
                ..
            } => f
                .debug_struct("Connect")
                .field("server", server)
                .field("group", group)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Disconnect => write!(f, "Disconnect"),
        }
    }
}

/// Encodes [`ScriptCommand`]s into the bytes written to the client's stdin
#[derive(Debug, Default)]
pub struct CliScriptCodec;

impl CliScriptCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self
    }

    /// Encode a command into a fresh buffer
    pub fn script(command: ScriptCommand) -> BytesMut {
        let mut buf = BytesMut::new();
        let mut codec = Self;
        // Encoding into a BytesMut cannot fail.
        let _ = codec.encode(command, &mut buf);
        buf
    }
}

impl Encoder<ScriptCommand> for CliScriptCodec {
    type Error = ResponseError;

    fn encode(&mut self, command: ScriptCommand, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match command {
            ScriptCommand::Connect {
                server,
                group,
                username,
                password,
            } => {
                let login = login_token(&group, &username);
                dst.put_slice(format!("connect {}\n{}\n{}\ny\n", server, login, password).as_bytes());
            }
            ScriptCommand::Disconnect => dst.put_slice(b"disconnect\n"),
        }
        Ok(())
    }
}

/// Frames interactive `connect {server}` output up to the group prompt.
///
/// Yields one item, everything buffered so far, once `Group: ` has been seen.
/// Output that ends without the prompt yields nothing.
#[derive(Debug, Default)]
pub struct GroupPromptCodec {
    done: bool,
}

impl GroupPromptCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self { done: false }
    }
}

impl Decoder for GroupPromptCodec {
    type Item = String;
    type Error = ResponseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.done {
            src.clear();
            return Ok(None);
        }

        let prompt = GROUP_PROMPT.as_bytes();
        if !src.windows(prompt.len()).any(|window| window == prompt) {
            return Ok(None); // Need more data
        }

        self.done = true;
        let buffered = src.split_to(src.len()).freeze();
        Ok(Some(String::from_utf8_lossy(&buffered).into_owned()))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let item = self.decode(src)?;
        // Whatever remains without a prompt is discarded.
        src.clear();
        Ok(item)
    }
}
