use nebo_slack::meet::meet_link;

use super::CommandResult;

/// Same link `/meet` would post, for use outside Slack.
pub fn run(words: &[String]) -> CommandResult {
    CommandResult { exit_code: 0, output: meet_link(&words.join(" ")) }
}
