//! Relevance signal names, weights, and the fixed rule tables they use.
//!
//! Every number the scorer adds lives here so the weights can be tuned and
//! tested without touching control flow.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// One independent piece of relevance evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Query contained in the question, or the question in the query.
    ExactQuestion,
    /// Query contained in the answer.
    ExactAnswer,
    /// Individual query tokens found in the question or answer.
    PartialPhrase,
    /// Share of query tokens present anywhere in the entry.
    Keywords,
    /// Present query tokens that are curated business terms.
    ImportantKeywords,
    /// An intent rule matched both query and question.
    Pattern,
    /// Lexical index TF-IDF score.
    TfIdf,
    /// Loose overlap, only for rewritten queries.
    Fuzzy,
}

/// Fixed additive weights for every signal.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalWeights {
    pub exact_question: f64,
    pub exact_answer: f64,
    /// Added once per matching query token.
    pub partial_phrase: f64,
    /// Multiplies the matched-token ratio.
    pub keyword_density: f64,
    /// Added once per matching curated keyword.
    pub important_keyword: f64,
    /// Minimum char-overlap ratio for a token to count as a curated keyword.
    pub important_similarity: f64,
    pub tf_idf: f64,
    pub fuzzy: f64,
    /// Fuzzy overlap at or below this is ignored.
    pub fuzzy_floor: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            exact_question: 1.5,
            exact_answer: 1.2,
            partial_phrase: 0.5,
            keyword_density: 1.0,
            important_keyword: 0.5,
            important_similarity: 0.6,
            tf_idf: 0.6,
            fuzzy: 0.4,
            fuzzy_floor: 0.2,
        }
    }
}

/// Business terms that make a query worth ranking higher.
pub static IMPORTANT_KEYWORDS: &[&str] = &[
    // General business
    "business", "company", "services", "products", "pricing", "cost", "price", "quote",
    "rates", "support", "help", "contact", "customer", "client", "order", "booking",
    "appointment",
    // Location and timing
    "location", "address", "branch", "office", "store", "hours", "timing", "open", "close",
    // Policies and payment
    "refund", "return", "warranty", "guarantee", "policy", "payment", "invoice", "bill",
    "transaction",
    // Software businesses
    "project", "software", "app", "website", "api", "integration", "plan", "subscription",
    // Customer intent
    "buy", "purchase", "book", "cancel", "modify", "upgrade", "trial", "demo",
    // Accounts
    "account", "profile", "login", "register", "signup", "issue", "problem", "error",
];

/// A query intent that maps onto a family of knowledge-base questions.
#[derive(Debug)]
pub struct PatternRule {
    pub intent: &'static str,
    /// Must match the lowercase query.
    pub query: Regex,
    /// Must match the lowercase entry question.
    pub question: Regex,
    pub bonus: f64,
}

pub static PATTERN_RULES: LazyLock<Vec<PatternRule>> = LazyLock::new(|| {
    let rule = |intent, query: &str, question: &str, bonus| PatternRule {
        intent,
        query: Regex::new(query).expect("Invalid pattern rule query regex"),
        question: Regex::new(question).expect("Invalid pattern rule question regex"),
        bonus,
    };

    vec![
        rule(
            "location",
            r"\bwhere\b.*\b(located|find|branch|office|store|are you)\b|\blocation\b|\baddress\b|\bdirections?\b",
            r"\bwhere\b|\blocat|\baddress\b|\bbranch|\boffice\b|\bstore\b|\bdirections?\b",
            1.2,
        ),
        rule(
            "contact",
            r"\bhow\b.*\bcontact\b|\bcontact\b|\bget\b.*\bin touch\b|\breach\b.*\byou\b|\bphone\b|\bemail\b|\bcall\b",
            r"\bcontact\b|\bphone\b|\bemail\b|\bcall\b|\breach\b|\bin touch\b",
            1.1,
        ),
        rule(
            "services",
            r"\bwhat\b.*\bservices?\b|\bservices?\b.*\bwhat\b|\boffer\b|\bprovide\b|\bwhat\b.*\byou do\b",
            r"\bservices?\b|\boffer\b|\bprovide\b|\bwhat\b.*\bdo\b",
            1.2,
        ),
        rule(
            "products",
            r"\bwhat\b.*\bproducts?\b|\bproducts?\b.*\bwhat\b|\bsell\b|\bmenu\b|\bcatalog",
            r"\bproducts?\b|\bsell\b|\bmenu\b|\bcatalog|\bitems?\b",
            1.2,
        ),
        rule(
            "pricing",
            r"\bhow\b.*\bmuch\b|\bprices?\b|\bpricing\b|\bcosts?\b|\bfees?\b|\bcharges?\b|\bexpensive\b|\bcheap\b",
            r"\bprices?\b|\bpricing\b|\bcosts?\b|\bfees?\b|\bcharges?\b|\bhow\b.*\bmuch\b|\brates?\b",
            1.3,
        ),
        rule(
            "quote",
            r"\bquotes?\b|\bestimates?\b|\brates\b",
            r"\bquotes?\b|\bestimates?\b|\brates?\b|\bprices?\b|\bpricing\b",
            1.1,
        ),
        rule(
            "hours",
            r"\bwhat\b.*\btime\b|\bwhen\b.*\b(open|close|closed)\b|\bopen(ing)?\b|\bclos(e|ed|ing)\b|\bhours\b|\btimings?\b|\bweekends?\b",
            r"\bhours\b|\btimings?\b|\btime\b|\bopen(ing)?\b|\bclos(e|ed|ing)\b|\bschedule\b",
            1.0,
        ),
        rule(
            "refund",
            r"\brefunds?\b|\breturns?\b|\bcancel\b.*\border\b|\bwarranty\b|\bguarantee\b|\bmoney back\b",
            r"\brefunds?\b|\breturns?\b|\bcancel|\bwarranty\b|\bguarantee\b|\bpolicy\b",
            1.0,
        ),
        rule(
            "support",
            r"\bproblems?\b|\bissues?\b|\berrors?\b|\bhelp\b.*\bneed|\bsupport\b|\bnot working\b|\bbroken\b",
            r"\bproblems?\b|\bissues?\b|\berrors?\b|\bsupport\b|\bhelp\b|\btroubleshoot",
            1.0,
        ),
        rule(
            "about",
            r"\bwho\b.*\bare\b|\babout\b.*\b(company|business|you)\b|\btell\b.*\babout\b.*\byou\b|\byour story\b",
            r"\bwho\b.*\bare\b|\babout\b|\bcompany\b|\bbusiness\b|\bhistory\b|\bstory\b",
            1.0,
        ),
    ]
});
