// ABOUTME: Remote command construction from CLI arguments.
// ABOUTME: Shell-quotes arguments and diverts -sshprop key=value pairs into client properties.

/// Reserved flag whose following `key=value` token becomes a client property
/// override instead of part of the remote command.
pub const PROPERTY_FLAG: &str = "-sshprop";

/// A built remote command plus the client property overrides extracted from
/// the argument list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLine {
    /// Shell-quoted, space-joined command string.
    pub command: String,
    /// Property overrides in encounter order, duplicates preserved.
    pub properties: Vec<(String, String)>,
}

/// Build the remote command from an argument list in a single left-to-right
/// pass.
///
/// A `-sshprop` token followed by `key=value` (non-empty key) is removed from
/// the command and recorded as a property override. A malformed pair such as
/// `=value` leaves both tokens in the command as ordinary arguments. Every
/// remaining argument is individually shell-quoted so arguments containing
/// spaces or shell metacharacters round-trip intact.
pub fn build(args: &[String]) -> CommandLine {
    let mut quoted = Vec::with_capacity(args.len());
    let mut properties = Vec::new();

    let mut i = 0;
    while i < args.len() {
        if args[i] == PROPERTY_FLAG && i + 1 < args.len() {
            let pair = &args[i + 1];
            // The key must be non-empty, so '=' at index 0 does not count.
            if let Some(eq) = pair.find('=').filter(|&eq| eq >= 1) {
                properties.push((pair[..eq].to_string(), pair[eq + 1..].to_string()));
                i += 2;
                continue;
            }
        }

        quoted.push(shell_words::quote(&args[i]).into_owned());
        i += 1;
    }

    CommandLine {
        command: quoted.join(" "),
        properties,
    }
}
