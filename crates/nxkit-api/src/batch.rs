// Command batching
//
// NX-API accepts several CLI lines in one `<input>` when they are joined
// with " ; ". The device applies them in order and reports one output per
// line, so a batch of N commands yields N outputs.

/// Separator placed between commands of a batch.
pub const SEPARATOR: &str = " ; ";

/// Terminator appended after the last command of a batch.
pub const TERMINATOR: &str = " ;";

/// Join an ordered list of commands into a single `<input>` string.
///
/// `["interface Ethernet1/1", "no shutdown"]` becomes
/// `"interface Ethernet1/1 ; no shutdown ;"`. An empty list yields an
/// empty string.
pub fn join<I, S>(commands: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = commands
        .into_iter()
        .map(|c| c.as_ref().to_owned())
        .collect();
    if parts.is_empty() {
        return String::new();
    }
    let mut joined = parts.join(SEPARATOR);
    joined.push_str(TERMINATOR);
    joined
}

/// Join a list of command groups, skipping empty groups.
///
/// Each group is joined with [`join`]; groups are separated by a single
/// space so the result is still one flat batch.
pub fn join_nested<S: AsRef<str>>(groups: &[Vec<S>]) -> String {
    groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| join(g.iter()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a joined batch back into its commands.
pub fn split(joined: &str) -> Vec<String> {
    let trimmed = joined.strip_suffix(TERMINATOR).unwrap_or(joined);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(SEPARATOR).map(String::from).collect()
}

/// Number of commands NX-API will see in an `<input>` string.
pub fn count(input: &str) -> usize {
    split(input).len()
}
