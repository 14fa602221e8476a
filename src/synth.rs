//! Synthetic URL Dataset Generation
//!
//! Generates labeled legitimate/phishing URLs for training when no real
//! dataset is available. Legitimate URLs compose common words into
//! ordinary-looking domains and paths; phishing URLs use one of five
//! strategies: typosquatting a popular brand, suspicious subdomains,
//! suspicious-word domains, literal IP hosts, or shortener hosts.
//!
//! All randomness flows through the caller's RNG, so a seeded generator
//! reproduces the same dataset byte for byte.

use rand::Rng;

/// TLDs sampled for generated domains.
const TLDS: &[&str] = &[
    ".com", ".org", ".net", ".edu", ".gov", ".co", ".io", ".info", ".biz",
];

/// Domain vocabulary shared by both generators. The first
/// [`POPULAR_CUTOFF`] entries are the brands typosquat strategies target.
const COMMON_WORDS: &[&str] = &[
    "google",
    "facebook",
    "amazon",
    "apple",
    "microsoft",
    "twitter",
    "instagram",
    "linkedin",
    "github",
    "youtube",
    "netflix",
    "spotify",
    "paypal",
    "ebay",
    "walmart",
    "target",
    "bank",
    "chase",
    "wellsfargo",
    "citi",
    "amex",
    "visa",
    "mastercard",
    "discover",
    "account",
    "login",
    "signin",
    "secure",
    "update",
    "verify",
    "confirm",
    "password",
    "user",
    "profile",
    "dashboard",
    "admin",
];

const POPULAR_CUTOFF: usize = 15;

/// Words phishing campaigns lean on for domains, paths, and queries.
const SUSPICIOUS_WORDS: &[&str] = &[
    "secure",
    "account",
    "banking",
    "login",
    "signin",
    "verify",
    "paypal",
    "password",
    "update",
    "confirm",
    "authenticate",
    "wallet",
    "alert",
    "notification",
    "access",
    "limited",
    "suspended",
    "unusual",
    "activity",
    "security",
    "important",
    "urgent",
    "official",
];

/// Shortening services used as phishing hosts.
const SHORTENING_SERVICES: &[&str] = &[
    "bit.ly", "goo.gl", "tinyurl.com", "t.co", "tr.im", "is.gd", "cli.gs", "ow.ly",
];

const LEGIT_EXTENSIONS: &[&str] = &[".html", ".php", ".aspx", ".jsp", ".do"];
const PHISH_EXTENSIONS: &[&str] = &[".php", ".html", ".aspx", ".do"];
const QUERY_FLAG_VALUES: &[&str] = &["true", "yes", "1", "redirect"];

const PATH_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

fn pick_scheme<R: Rng>(rng: &mut R) -> &'static str {
    if rng.gen_bool(0.5) {
        "http://"
    } else {
        "https://"
    }
}

/// Generate an ordinary-looking legitimate URL.
pub fn generate_legitimate_url<R: Rng>(rng: &mut R) -> String {
    let protocol = pick_scheme(rng);
    let www = if rng.gen_bool(0.8) { "www." } else { "" };

    let mut domain = pick(rng, COMMON_WORDS).to_string();
    if rng.gen_bool(0.1) {
        domain.push('-');
        domain.push_str(pick(rng, COMMON_WORDS));
    }
    if rng.gen_bool(0.2) {
        domain = format!("{}.{}", pick(rng, COMMON_WORDS), domain);
    }
    let tld = pick(rng, TLDS);

    let mut path = String::new();
    if rng.gen_bool(0.7) {
        for _ in 0..rng.gen_range(1..=3) {
            path.push('/');
            path.push_str(pick(rng, COMMON_WORDS));
        }
        if rng.gen_bool(0.3) {
            path.push_str(pick(rng, LEGIT_EXTENSIONS));
        }
    }

    let mut query = String::new();
    if rng.gen_bool(0.4) {
        for i in 0..rng.gen_range(1..=3) {
            query.push(if i == 0 { '?' } else { '&' });
            query.push_str(pick(rng, COMMON_WORDS));
            query.push('=');
            query.push_str(pick(rng, COMMON_WORDS));
        }
    }

    format!("{protocol}{www}{domain}{tld}{path}{query}")
}

/// Misspell a popular brand name: leet substitution, character
/// insertion, or adjacent transposition.
fn typosquat<R: Rng>(rng: &mut R) -> String {
    let mut target = pick(rng, &COMMON_WORDS[..POPULAR_CUTOFF]).to_string();
    match rng.gen_range(1..=3) {
        1 => {
            for (plain, leet) in [('a', "4"), ('e', "3"), ('i', "1"), ('o', "0"), ('s', "5"), ('l', "1")] {
                if target.contains(plain) && rng.gen_bool(0.3) {
                    target = target.replace(plain, leet);
                }
            }
        }
        2 => {
            let pos = rng.gen_range(1..target.len());
            let ch = (b'a' + rng.gen_range(0..26)) as char;
            target.insert(pos, ch);
        }
        _ => {
            if target.len() > 3 {
                let pos = rng.gen_range(1..target.len() - 1);
                let mut bytes = target.into_bytes();
                bytes.swap(pos, pos + 1);
                target = String::from_utf8(bytes).unwrap_or_default();
            }
        }
    }
    target
}

/// Generate a phishing URL using one of five strategies.
pub fn generate_phishing_url<R: Rng>(rng: &mut R) -> String {
    let protocol = pick_scheme(rng);

    let mut domain = match rng.gen_range(1..=5) {
        1 => typosquat(rng),
        2 => {
            // A real brand as the subdomain of a lookalike host
            let real = pick(rng, &COMMON_WORDS[..POPULAR_CUTOFF]);
            let fake = format!(
                "{}{}",
                pick(rng, &COMMON_WORDS[POPULAR_CUTOFF..]),
                pick(rng, &["-secure", "-login", "-account"])
            );
            format!("{real}.{fake}")
        }
        3 => {
            let mut d = pick(rng, COMMON_WORDS).to_string();
            if rng.gen_bool(0.5) {
                d.push('-');
                d.push_str(pick(rng, SUSPICIOUS_WORDS));
            }
            d
        }
        4 => {
            // Literal IP host, no domain machinery applies
            return format!(
                "{protocol}{}.{}.{}.{}/login.php",
                rng.gen_range(1..=255),
                rng.gen_range(1..=255),
                rng.gen_range(1..=255),
                rng.gen_range(1..=255)
            );
        }
        _ => {
            let service = pick(rng, SHORTENING_SERVICES);
            let ch = PATH_CHARS[rng.gen_range(0..PATH_CHARS.len())] as char;
            return format!("{protocol}{service}/{ch}");
        }
    };

    let tld = pick(rng, TLDS);

    let mut path = String::new();
    if rng.gen_bool(0.9) {
        path.push('/');
        path.push_str(pick(rng, SUSPICIOUS_WORDS));
        if rng.gen_bool(0.5) {
            path.push('/');
            path.push_str(pick(rng, SUSPICIOUS_WORDS));
        }
        if rng.gen_bool(0.6) {
            path.push_str(pick(rng, PHISH_EXTENSIONS));
        }
    }

    let mut query = String::new();
    if rng.gen_bool(0.7) {
        for i in 0..rng.gen_range(1..=3) {
            query.push(if i == 0 { '?' } else { '&' });
            query.push_str(pick(rng, SUSPICIOUS_WORDS));
            query.push('=');
            query.push_str(pick(rng, QUERY_FLAG_VALUES));
        }
    }

    if rng.gen_bool(0.2) {
        domain = format!(
            "{}:{}@{domain}",
            pick(rng, COMMON_WORDS),
            pick(rng, COMMON_WORDS)
        );
    }

    format!("{protocol}{domain}{tld}{path}{query}")
}

/// Generate `samples` labeled URLs; `true` marks phishing.
///
/// The phishing count is `floor(samples * phishing_ratio)`, so a 0.5
/// ratio over an even sample count splits exactly in half. Legitimate
/// URLs come first, matching the dataset layout trainers expect.
pub fn generate<R: Rng>(samples: usize, phishing_ratio: f64, rng: &mut R) -> Vec<(String, bool)> {
    let phishing = ((samples as f64 * phishing_ratio) as usize).min(samples);
    let legitimate = samples - phishing;

    let mut out = Vec::with_capacity(samples);
    for _ in 0..legitimate {
        out.push((generate_legitimate_url(rng), false));
    }
    for _ in 0..phishing {
        out.push((generate_phishing_url(rng), true));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn ratio_controls_label_counts_exactly() {
        let mut rng = StdRng::seed_from_u64(1);
        let pairs = generate(100, 0.5, &mut rng);
        assert_eq!(pairs.len(), 100);
        assert_eq!(pairs.iter().filter(|(_, label)| *label).count(), 50);

        let pairs = generate(10, 0.0, &mut rng);
        assert!(pairs.iter().all(|(_, label)| !label));

        let pairs = generate(10, 1.0, &mut rng);
        assert!(pairs.iter().all(|(_, label)| *label));
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(generate(200, 0.5, &mut a), generate(200, 0.5, &mut b));
    }

    #[test]
    fn generated_urls_carry_a_scheme() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(generate_legitimate_url(&mut rng).starts_with("http"));
            assert!(generate_phishing_url(&mut rng).starts_with("http"));
        }
    }

    #[test]
    fn typosquat_never_returns_the_exact_brand_shape() {
        // Not every strategy mutates (leet rolls can all miss), but the
        // output must always be non-empty lowercase-ish ASCII.
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let squat = typosquat(&mut rng);
            assert!(!squat.is_empty());
            assert!(squat.is_ascii());
        }
    }
}
