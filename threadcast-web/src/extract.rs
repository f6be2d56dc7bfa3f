use scraper::{Html, Selector};
use threadcast_common::{Result, ThreadcastError};

/// Collect up to `limit` non-empty text snippets matched by `selector`.
///
/// Text is whitespace-collapsed; `strip_prefix` (e.g. arXiv's `Title:`
/// label) is removed from the start of each snippet before trimming.
pub fn extract_snippets(
    html: &str,
    selector: &str,
    strip_prefix: Option<&str>,
    limit: usize,
) -> Result<Vec<String>> {
    let selector = Selector::parse(selector)
        .map_err(|e| ThreadcastError::SourceFetch(format!("bad selector {selector:?}: {e}")))?;
    let document = Html::parse_document(html);

    let snippets = document
        .select(&selector)
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .map(|text| match strip_prefix {
            Some(prefix) => text
                .strip_prefix(prefix)
                .map(|rest| rest.trim().to_string())
                .unwrap_or(text),
            None => text,
        })
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect();
    Ok(snippets)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARXIV_PAGE: &str = r#"
<html><head><title>Artificial Intelligence</title></head><body>
<dl id="articles">
  <dd><div class="meta">
    <div class="list-title mathjax"><span class="descriptor">Title:</span>
      Scaling Laws for
      Tool-Using Agents
    </div>
  </div></dd>
  <dd><div class="meta">
    <div class="list-title mathjax"><span class="descriptor">Title:</span> Sparse Mixture Routing</div>
  </div></dd>
  <dd><div class="meta"><div class="list-title mathjax"><span class="descriptor">Title:</span>   </div></div></dd>
</dl>
</body></html>"#;

    const TECHCRUNCH_PAGE: &str = r#"
<html><body>
  <h2 class="post-block__title"><a href="/a">  OpenAI ships a new model </a></h2>
  <h2 class="post-block__title"><a href="/b">Robotics startup raises $50M</a></h2>
  <h2 class="other"><a href="/c">Not a headline</a></h2>
</body></html>"#;

    #[test]
    fn arxiv_titles_lose_their_label_and_line_breaks() {
        let titles = extract_snippets(ARXIV_PAGE, "div.list-title", Some("Title:"), 5).unwrap();
        assert_eq!(
            titles,
            vec!["Scaling Laws for Tool-Using Agents", "Sparse Mixture Routing"]
        );
    }

    #[test]
    fn techcrunch_headlines_are_trimmed() {
        let headlines =
            extract_snippets(TECHCRUNCH_PAGE, "h2.post-block__title a", None, 5).unwrap();
        assert_eq!(
            headlines,
            vec!["OpenAI ships a new model", "Robotics startup raises $50M"]
        );
    }

    #[test]
    fn limit_caps_the_snippet_count() {
        let page: String = (0..10)
            .map(|i| format!("<h2 class=\"post-block__title\"><a>Story {i}</a></h2>"))
            .collect();
        let headlines = extract_snippets(&page, "h2.post-block__title a", None, 5).unwrap();
        assert_eq!(headlines.len(), 5);
        assert_eq!(headlines[4], "Story 4");
    }

    #[test]
    fn invalid_selector_is_a_source_failure() {
        let err = extract_snippets("<html></html>", "div[", None, 5).unwrap_err();
        assert!(matches!(err, ThreadcastError::SourceFetch(_)));
    }

    #[test]
    fn unrelated_markup_yields_nothing() {
        let got = extract_snippets("<p>nothing here</p>", "div.list-title", None, 5).unwrap();
        assert!(got.is_empty());
    }
}
