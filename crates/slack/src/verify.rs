/// Checks the verification token Slack attaches to every slash command.
pub fn verify_token(provided: &str, expected: &str) -> bool {
    constant_time_eq(provided, expected)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::verify_token;

    #[test]
    fn matching_token_is_accepted() {
        assert!(verify_token("s3cret-token", "s3cret-token"));
    }

    #[test]
    fn mismatched_or_truncated_tokens_are_rejected() {
        assert!(!verify_token("s3cret-tokem", "s3cret-token"));
        assert!(!verify_token("s3cret", "s3cret-token"));
        assert!(!verify_token("", "s3cret-token"));
    }
}
