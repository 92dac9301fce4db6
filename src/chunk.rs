//! Byte-bounded text chunking that never splits a UTF-8 code point

/// Split `text` into borrowed chunks of at most `max_bytes` bytes each.
///
/// Boundaries are moved back to the nearest char boundary. When a single
/// code point is wider than `max_bytes` the window grows forward to the end
/// of that code point instead, so the chunk is oversized but still valid.
/// Returns nothing for empty text or a zero budget.
pub fn chunk_str(text: &str, max_bytes: usize) -> Vec<&str>
{   if max_bytes == 0 || text.is_empty()
    {   return Vec::new();
    }

    let total_len = text.len();
    let mut chunks = Vec::with_capacity(total_len / max_bytes + 1);
    let mut start = 0;

    while start < total_len
    {   let mut end = start.saturating_add(max_bytes).min(total_len);

        if end < total_len
        {   while end > start && !text.is_char_boundary(end)
            {   end -= 1;
            }
            // code point wider than the budget
            if end == start
            {   end = start + max_bytes;
                while !text.is_char_boundary(end)
                {   end += 1;
                }
            }
        }

        chunks.push(&text[start..end]);
        start = end;
    }

    chunks
}

/// Owned variant of [`chunk_str`].
pub fn chunk_text_by_max_bytes(text: &str, max_bytes: usize) -> Vec<String>
{   chunk_str(text, max_bytes)
      .into_iter()
      .map(str::to_owned)
      .collect()
}

#[cfg(test)]
mod tests
{   use super::*;

    fn assert_invariants(text: &str, max_bytes: usize)
    {   let chunks = chunk_str(text, max_bytes);
        assert_eq!(chunks.concat(), text, "max_bytes={}", max_bytes);
        for c in &chunks
        {   assert!(!c.is_empty());
            if c.len() > max_bytes
            {   // only a lone oversized code point may exceed the budget
                assert_eq!(c.chars().count(), 1, "chunk {:?}", c);
            }
        }
    }

    #[test]
    fn ascii_splits_on_exact_offsets()
    {   assert_eq!(
          chunk_str("hello world", 5),
          vec!["hello", " worl", "d"]
        );
    }

    #[test]
    fn degenerate_inputs_yield_nothing()
    {   assert!(chunk_str("", 10).is_empty());
        assert!(chunk_str("text", 0).is_empty());
        assert!(chunk_text_by_max_bytes("", 0).is_empty());
    }

    #[test]
    fn budget_larger_than_text_returns_whole_text()
    {   assert_eq!(chunk_str("short", 64), vec!["short"]);
    }

    #[test]
    fn backs_off_to_char_boundary()
    {   // é is two bytes
        assert_eq!(chunk_str("héllo", 2), vec!["h", "é", "ll", "o"]);
    }

    #[test]
    fn oversized_code_point_is_kept_whole()
    {   assert_eq!(chunk_str("a😀b", 3), vec!["a", "😀", "b"]);
        assert_eq!(chunk_str("😀😀", 1), vec!["😀", "😀"]);
    }

    #[test]
    fn invariants_hold_for_mixed_width_text()
    {   let text = "Grüße aus Köln, 東京から こんにちは 🚀🌍 and plain ascii.";
        for max_bytes in 1..=text.len() + 1
        {   assert_invariants(text, max_bytes);
        }
    }

    #[test]
    fn owned_chunks_match_borrowed()
    {   let text = "añb€c";
        assert_eq!(
          chunk_text_by_max_bytes(text, 3),
          chunk_str(text, 3)
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
        );
    }
}
