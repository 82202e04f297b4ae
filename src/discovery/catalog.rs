//! Curated inputs for probe and search discovery

use crate::models::Provider;

/// Companies probed by name on Lever, grouped loosely by sector
pub const KNOWN_COMPANIES: &[&str] = &[
    // Consumer and platform
    "Netflix", "Spotify", "Airbnb", "DoorDash", "Stripe", "Uber", "Lyft", "Slack",
    "Pinterest", "Shopify", "Dropbox", "Twitter", "Square", "Zoom", "Coinbase",
    "Twilio", "Gitlab", "Notion", "Atlassian", "Figma", "Canva", "Reddit", "Medium",
    "Asana", "MongoDB", "Datadog", "Cloudflare", "Fastly", "Snowflake", "Databricks",
    // Big tech
    "Google", "Microsoft", "Amazon", "Apple", "Meta", "Oracle", "Adobe", "IBM",
    "Intel", "Cisco", "Salesforce", "VMware", "Nvidia", "AMD", "Tesla", "Intuit",
    // Fintech
    "Plaid", "Robinhood", "Chime", "SoFi", "Brex", "Affirm", "Wise", "Klarna",
    "Revolut", "Monzo", "Ripple", "Gemini", "Carta", "Adyen", "Checkout", "Marqeta",
    "Chainalysis", "Addepar", "Wealthfront", "Betterment", "Kraken",
    // Enterprise SaaS
    "Workday", "ServiceNow", "Okta", "Splunk", "Zendesk", "DocuSign", "Airtable",
    "Box", "Supabase", "Vercel", "Netlify", "DigitalOcean", "CircleCI", "HashiCorp",
    "Confluent", "Elastic", "Grafana", "PagerDuty", "LaunchDarkly", "Sentry",
    "Amplitude", "Segment", "Mixpanel",
    // Health tech
    "Oscar", "One Medical", "Color", "Zocdoc", "GoodRx", "Hims", "Capsule", "Tempus",
    "Flatiron Health", "Veeva", "Sword Health", "Devoted Health", "Cedar",
    "Carbon Health", "Cityblock", "Omada Health",
    // Consumer
    "Instacart", "Postmates", "Getir", "Deliveroo", "Glovo", "Wolt", "Lime", "Bird",
    "HelloFresh", "Allbirds", "Warby Parker", "Glossier", "Peloton", "Calm",
    "Headspace", "ClassPass", "Strava", "Duolingo", "Quizlet", "Coursera",
    // Gaming
    "Epic Games", "Riot Games", "Unity", "Roblox", "Niantic", "Discord", "Twitch",
    // Security
    "CrowdStrike", "SentinelOne", "Snyk", "1Password", "Netskope", "Wiz", "Lacework",
    // AI/ML
    "OpenAI", "Cohere", "Hugging Face", "Scale AI", "Weights & Biases", "Stability AI",
    "Runway", "Synthesia", "Deepgram", "Anyscale", "Labelbox", "Snorkel", "Hex", "Modal",
    // Miscellaneous
    "Zapier", "Calendly", "Miro", "Loom", "Linear", "Retool", "Ramp", "Gusto",
    "Rippling", "Deel", "Gong", "Webflow", "Coda", "Superhuman", "Typeform", "Lattice",
    "Ashby", "Gem",
];

/// Search terms used by `discover --search`
pub fn search_terms(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Greenhouse => &[
            "site:boards.greenhouse.io careers",
            "powered by greenhouse",
            "greenhouse ats jobs",
        ],
        Provider::Lever => &[
            "site:jobs.lever.co careers",
            "powered by lever",
            "lever ats jobs",
        ],
    }
}

/// Longer term lists for exhaustive runs
pub fn extended_search_terms(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Greenhouse => &[
            "site:boards.greenhouse.io careers",
            "site:boards.greenhouse.io jobs",
            "apply through greenhouse io",
            "powered by greenhouse",
            "apply for this job greenhouse",
            "we use greenhouse",
            "greenhouse applicant tracking",
            "greenhouse ats jobs",
            "using greenhouse for jobs",
            "careers greenhouse",
            "join our team greenhouse",
            "open positions greenhouse",
        ],
        Provider::Lever => &[
            "site:jobs.lever.co careers",
            "site:jobs.lever.co apply",
            "apply through lever.co",
            "powered by lever",
            "apply for this job lever",
            "we use lever",
            "lever applicant tracking",
            "lever ats jobs",
            "using lever for jobs",
            "careers lever",
            "join our team lever",
            "open positions lever",
        ],
    }
}

/// Industry buckets and the keywords searched for each
pub const INDUSTRY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "tech",
        &[
            "tech", "software", "technology", "digital", "cloud", "data", "AI", "ML",
            "machine learning", "engineering", "IoT", "quantum", "cybersecurity",
        ],
    ),
    (
        "fintech",
        &[
            "fintech", "finance", "banking", "payment", "crypto", "blockchain", "defi",
            "insuretech", "lending", "investing", "wealth", "trading", "insurance", "credit",
        ],
    ),
    (
        "healthtech",
        &[
            "health", "healthcare", "biotech", "medical", "pharma", "genomics", "telehealth",
            "life science", "clinical", "diagnostic", "therapeutics", "mental health", "wellness",
        ],
    ),
    (
        "ecommerce",
        &[
            "ecommerce", "retail", "marketplace", "commerce", "brand", "consumer",
            "direct to consumer", "d2c",
        ],
    ),
    (
        "edtech",
        &[
            "education", "learning", "edtech", "school", "university", "training", "tutor",
            "e-learning",
        ],
    ),
    (
        "proptech",
        &[
            "proptech", "real estate", "property", "housing", "rental", "mortgage",
            "construction",
        ],
    ),
    (
        "mobility",
        &[
            "mobility", "transportation", "automotive", "vehicle", "delivery", "logistics",
            "shipping", "freight", "fleet", "electric", "autonomous", "drone",
        ],
    ),
];

/// `(query, max_results)` pairs issued for one industry keyword
pub fn industry_queries(keyword: &str) -> [(String, usize); 4] {
    [
        (format!("{keyword} companies site:boards.greenhouse.io"), 30),
        (format!("{keyword} companies site:jobs.lever.co"), 30),
        (format!("{keyword} greenhouse job board"), 20),
        (format!("{keyword} lever job board"), 20),
    ]
}

/// Href fragments that mark a link as hiring-related during recursive discovery
pub const HIRING_KEYWORDS: &[&str] = &["career", "job", "hiring", "work", "position"];

/// Slug spellings probed for a company name: `One Medical` yields
/// `onemedical`, `one-medical` and `one medical`. Duplicates are dropped.
pub fn slug_variants(name: &str) -> Vec<String> {
    let lower = name.trim().to_lowercase();
    let candidates = [
        lower.replace(' ', ""),
        lower.replace(' ', "-"),
        lower.clone(),
    ];

    let mut variants = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_variants() {
        assert_eq!(
            slug_variants("One Medical"),
            vec!["onemedical", "one-medical", "one medical"]
        );
        assert_eq!(slug_variants("Stripe"), vec!["stripe"]);
        assert!(slug_variants("  ").is_empty());
    }

    #[test]
    fn test_industry_queries() {
        let queries = industry_queries("fintech");
        assert_eq!(queries[0], ("fintech companies site:boards.greenhouse.io".to_string(), 30));
        assert_eq!(queries[3], ("fintech lever job board".to_string(), 20));
    }

    #[test]
    fn test_search_terms_target_provider() {
        for provider in Provider::ALL {
            assert!(search_terms(provider)
                .iter()
                .all(|t| t.contains(provider.as_str())));
            assert!(extended_search_terms(provider).len() > search_terms(provider).len());
        }
    }
}
