/// Splits rendered lines into chunks that never exceed `limit` characters.
/// A single line longer than `limit` becomes its own chunk, hard-truncated
/// to exactly `limit` characters (spec.md §8 boundary behavior); everything
/// else is packed greedily, one logical line per `\n`.
pub fn chunk_message(lines: &[String], limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.push(truncate_chars(line, limit));
            continue;
        }

        let additional = if current.is_empty() { line_len } else { line_len + 1 };
        if current.chars().count() + additional > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn truncate_chars(s: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    s.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_lines_under_the_limit_into_one_chunk() {
        let lines = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let chunks = chunk_message(&lines, 4096);
        assert_eq!(chunks, vec!["a\nb\nc".to_string()]);
    }

    #[test]
    fn single_oversized_line_is_its_own_truncated_chunk() {
        let long_line = "x".repeat(5000);
        let chunks = chunk_message(&[long_line], 4096);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chars().count(), 4096);
    }

    #[test]
    fn splits_into_multiple_chunks_when_limit_exceeded() {
        let lines: Vec<String> = (0..10).map(|i| "x".repeat(30) + &i.to_string()).collect();
        let chunks = chunk_message(&lines, 100);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn concat_of_chunks_preserves_every_line() {
        let lines = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        let chunks = chunk_message(&lines, 8);
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split('\n')).collect();
        assert_eq!(rejoined, vec!["alpha", "beta", "gamma"]);
    }
}
