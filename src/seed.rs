//! Evergreen content shown ahead of live documents.
//!
//! Seed ids (`seed-event-N`, `seed-news-N`, `seed-tool-N`, `seed-course-N`,
//! `seed-sanchar-N`) never collide with store ids, which are hex digests.

use serde_json::{json, Value};

use crate::{normalize::normalize_all, record::Item};

const CYBER_CELL_PHONE: &str = "0832 244 3201";
const CYBER_CELL_EMAIL: &str = "picyber@goapolice.gov.in";

fn contact(organizer: &str) -> Value {
    json!({ "organizer": organizer, "phone": CYBER_CELL_PHONE, "email": CYBER_CELL_EMAIL })
}

/// Seed workshops and seminars for the events page.
pub fn events() -> Vec<Item> {
    let police = "Goa Police Cyber Cell";
    let team = "Cyber Ranger Team";
    let raw = vec![
        json!({
            "id": "seed-event-1",
            "title": "Cybersecurity Fundamentals Workshop",
            "type": "Workshop",
            "status": "upcoming",
            "date": "2025-02-15",
            "time": "10:00 AM - 12:00 PM",
            "location": "Panjim",
            "venue": "Goa State Central Library, Panjim",
            "capacity": "50 participants",
            "summary": "Learn the basics of cybersecurity including common threats, password security, and safe online practices. Perfect for beginners and general public.",
            "details": [
                "Understanding cyber threats and vulnerabilities",
                "Creating strong passwords and two-factor authentication",
                "Safe browsing and email practices",
                "Recognizing phishing attempts",
                "Mobile device security basics"
            ],
            "contact": contact(police),
            "reference": "https://www.csk.gov.in/alerts.html"
        }),
        json!({
            "id": "seed-event-2",
            "title": "Digital Banking Security Seminar",
            "type": "Seminar",
            "status": "upcoming",
            "date": "2025-02-20",
            "time": "2:00 PM - 4:00 PM",
            "location": "Margao",
            "venue": "Margao Municipal Council Hall",
            "capacity": "75 participants",
            "summary": "Comprehensive session on secure online banking, UPI transactions, and protecting yourself from financial fraud.",
            "details": [
                "Secure online banking setup and best practices",
                "UPI safety and fraud prevention techniques",
                "Mobile banking security measures",
                "Recognizing banking scams and fake apps",
                "Two-factor authentication setup"
            ],
            "contact": contact(team)
        }),
        json!({
            "id": "seed-event-3",
            "title": "Senior Citizens Cyber Safety Program",
            "type": "Program",
            "status": "ongoing",
            "date": "2025-02-10",
            "time": "9:00 AM - 11:00 AM",
            "location": "Vasco",
            "venue": "Vasco Municipal Council",
            "capacity": "30 participants",
            "summary": "Specialized program designed for senior citizens to learn about cyber threats and safe digital practices.",
            "details": [
                "Understanding common scams targeting seniors",
                "Safe use of smartphones and tablets",
                "Protecting personal information online",
                "Recognizing fake calls and messages",
                "Emergency contacts and reporting procedures"
            ],
            "contact": contact(police)
        }),
        json!({
            "id": "seed-event-4",
            "title": "Small Business Cybersecurity Training",
            "type": "Training",
            "status": "upcoming",
            "date": "2025-02-25",
            "time": "3:00 PM - 5:00 PM",
            "location": "Mapusa",
            "venue": "Mapusa Municipal Council",
            "capacity": "40 participants",
            "summary": "Essential cybersecurity training for small business owners and entrepreneurs to protect their business data and customer information.",
            "details": [
                "Data protection and privacy regulations",
                "Secure payment processing and POS security",
                "Employee cybersecurity training",
                "Backup and recovery strategies",
                "Incident response planning"
            ],
            "contact": contact(team)
        }),
        json!({
            "id": "seed-event-5",
            "title": "Student Cyber Awareness Workshop",
            "type": "Workshop",
            "status": "completed",
            "date": "2025-01-28",
            "time": "10:00 AM - 12:00 PM",
            "location": "Panjim",
            "venue": "Goa University Campus",
            "capacity": "100 participants",
            "summary": "Interactive workshop for college students covering social media safety, online privacy, and cyberbullying prevention.",
            "details": [
                "Social media privacy settings and safety",
                "Online reputation management",
                "Cyberbullying prevention and reporting",
                "Safe online gaming and entertainment",
                "Digital citizenship and responsible online behavior"
            ],
            "contact": contact(police)
        }),
        json!({
            "id": "seed-event-6",
            "title": "Phishing Awareness and Prevention Workshop",
            "type": "Workshop",
            "status": "upcoming",
            "date": "2025-03-05",
            "time": "11:00 AM - 1:00 PM",
            "location": "Margao",
            "venue": "Margao Railway Station Community Hall",
            "capacity": "60 participants",
            "summary": "Hands-on workshop to identify and avoid phishing attacks through real-world examples and interactive exercises.",
            "details": [
                "Recognizing phishing emails and messages",
                "Identifying suspicious links and attachments",
                "Social engineering tactics and prevention",
                "Reporting phishing attempts",
                "Creating strong security awareness"
            ],
            "contact": contact(team),
            "reference": "https://www.phishing.org/what-is-phishing"
        }),
        json!({
            "id": "seed-event-7",
            "title": "Mobile Security Essentials Workshop",
            "type": "Workshop",
            "status": "upcoming",
            "date": "2025-03-10",
            "time": "2:00 PM - 4:00 PM",
            "location": "Vasco",
            "venue": "Vasco Railway Station Community Center",
            "capacity": "45 participants",
            "summary": "Learn how to secure your mobile devices, protect personal data, and avoid mobile-specific threats.",
            "details": [
                "Mobile device security settings and updates",
                "App security and permission management",
                "Public Wi-Fi safety and VPN usage",
                "Mobile malware prevention",
                "Secure mobile payments and banking"
            ],
            "contact": contact(police)
        }),
        json!({
            "id": "seed-event-8",
            "title": "Cyber Crime Reporting and Legal Awareness",
            "type": "Seminar",
            "status": "upcoming",
            "date": "2025-03-15",
            "time": "10:00 AM - 12:00 PM",
            "location": "Mapusa",
            "venue": "Mapusa Police Station Community Hall",
            "capacity": "80 participants",
            "summary": "Learn about cybercrime reporting procedures, legal aspects, and how to seek help when you become a victim.",
            "details": [
                "Cybercrime reporting procedures and helplines",
                "Legal framework and cyber laws in India",
                "Evidence collection and preservation",
                "Victim support and recovery resources",
                "Prevention strategies and best practices"
            ],
            "contact": contact(police),
            "reference": "https://cybercrime.gov.in/"
        }),
    ];
    normalize_all(raw)
}

/// Seed incident reports for the news page, Goa stories first.
pub fn news() -> Vec<Item> {
    let raw = vec![
        json!({
            "id": "seed-news-1",
            "type": "impersonation",
            "region": "Goa",
            "title": "Digital Arrest Scam — Victim in Canacona Loses Large Sum",
            "date": "2025-08-12",
            "summary": "Victims received messages and calls impersonating officials (crime branch, public prosecutor) and were coerced to transfer money under the threat of legal action. High-value transfers followed.",
            "imageAlt": "Digital arrest scam illustration showing phone and warning signs",
            "tips": [
                "Never transfer money to unknown callers claiming to be police; verify by calling local police station directly.",
                "Do not share OTPs or bank details over phone or chat.",
                "Ask for official documents and verify through official channels."
            ]
        }),
        json!({
            "id": "seed-news-2",
            "type": "website-defacement",
            "region": "Goa",
            "title": "Goa Government Website Defaced with Ads (WCD Site)",
            "date": "2025-07-30",
            "summary": "A content-management vulnerability led to the Women & Child Development department site being replaced with gambling/casino ads. An FIR was filed and sites were taken down for audit.",
            "imageAlt": "Website defacement showing hacked government website",
            "tips": [
                "Keep CMS and plugins updated and remove unused admin accounts.",
                "Use HTTPS with valid certificates and Content Security Policy (CSP).",
                "Perform regular backups and security audits; use a web application firewall."
            ]
        }),
        json!({
            "id": "seed-news-3",
            "type": "senior-targeted",
            "region": "Goa",
            "title": "Seniors Targeted in \"Digital Arrest\" & Phone Scams",
            "date": "2025-06-15",
            "summary": "A spike in scams targeting elderly Goans resulted in dozens reporting financial losses after being threatened or manipulated over calls and messages.",
            "imageAlt": "Senior citizen using smartphone with security concerns",
            "tips": [
                "Teach seniors to never share bank info or OTPs; designate a trusted family member to verify suspicious calls.",
                "Use caller ID apps and register on Do Not Disturb (DND) services.",
                "Report threats immediately to local police and the national cybercrime portal."
            ]
        }),
        json!({
            "id": "seed-news-4",
            "type": "financial-fraud",
            "region": "India",
            "title": "Online Share-Trading Racket — Investors Duped Across India",
            "date": "2025-09-02",
            "summary": "Fake trading apps and groups lured investors with promises of high returns; initial small payouts built trust before large sums were blocked and victims could not withdraw.",
            "imageAlt": "Financial fraud showing fake trading app interface",
            "tips": [
                "Verify trading platforms; check regulator (SEBI) registration and credible reviews.",
                "Avoid schemes promising guaranteed high returns and pressure to invest quickly.",
                "Use two-factor authentication on finance accounts and monitor bank statements."
            ]
        }),
        json!({
            "id": "seed-news-5",
            "type": "sim-aadhaar-misuse",
            "region": "India",
            "title": "Fake SIMs & Aadhaar Misuse Network Busted",
            "date": "2025-08-20",
            "summary": "Law enforcement arrested suspects who created fake SIM cards and bank accounts using stolen Aadhaar data, later used for money transfers and fraud.",
            "imageAlt": "SIM card and identity theft illustration",
            "tips": [
                "Do not share Aadhaar details or photos on untrusted platforms.",
                "Enable mobile number lock/port-out protection with telecom providers.",
                "Regularly check credit reports for unknown accounts."
            ]
        }),
        json!({
            "id": "seed-news-6",
            "type": "ai-phishing-trend",
            "region": "India",
            "title": "AI-Driven Phishing & Deepfake Tactics on the Rise",
            "date": "2025-08-07",
            "summary": "Security reports note increased use of AI to craft believable phishing messages and deepfake audio to impersonate executives or relatives to coerce payments.",
            "imageAlt": "AI and deepfake technology showing artificial intelligence",
            "tips": [
                "Treat unexpected urgent requests with suspicion; verify through a separate known channel.",
                "Train teams and family members on the signs of advanced social engineering.",
                "Use email authentication (SPF, DKIM, DMARC) for organisations."
            ]
        }),
    ];
    normalize_all(raw)
}

/// Action Hub directory: official portals grouped by section.
pub fn tools() -> Vec<Item> {
    let raw = vec![
        json!({
            "id": "seed-tool-1",
            "action": "Verify My Broker",
            "category": "Financial Safety",
            "categoryTag": "Financial Tool",
            "description": "Verify the authenticity of your stock broker or investment advisor through SEBI's official registry.",
            "link": "https://www.sebi.gov.in/sebiweb/home/HomeAction.do?doListing=yes&sid=3&ssid=26&smid=0",
            "keywords": ["broker", "sebi", "stock", "investment", "financial", "verify"]
        }),
        json!({
            "id": "seed-tool-2",
            "action": "Check Bank Authenticity",
            "category": "Financial Safety",
            "categoryTag": "Financial Tool",
            "description": "Verify if a bank is authorized by the Reserve Bank of India (RBI) and check its license status.",
            "link": "https://www.rbi.org.in/Scripts/BS_ViewMasDirections.aspx",
            "keywords": ["bank", "rbi", "financial", "authenticity", "verify", "license"]
        }),
        json!({
            "id": "seed-tool-3",
            "action": "Block Stolen Phone",
            "category": "Telecom Hub",
            "categoryTag": "Government Official",
            "description": "Block your lost or stolen mobile phone through CEIR (Central Equipment Identity Register) to prevent misuse.",
            "link": "https://www.ceir.gov.in/Home/index.jsp",
            "keywords": ["phone", "mobile", "stolen", "lost", "block", "ceir", "sim"]
        }),
        json!({
            "id": "seed-tool-4",
            "action": "See SIMs in My Name",
            "category": "Telecom Hub",
            "categoryTag": "Identity Security",
            "description": "Check all mobile connections registered in your name through TAFCOP (Telecom Analytics for Fraud Management and Consumer Protection).",
            "link": "https://www.tafcop.sancharsaathi.gov.in/",
            "keywords": ["sim", "mobile", "connection", "name", "tafcop", "identity"]
        }),
        json!({
            "id": "seed-tool-5",
            "action": "Access Sanchar Saathi Portal",
            "category": "Telecom Hub",
            "categoryTag": "Government Official",
            "description": "Comprehensive portal by DoT for mobile security, blocking lost phones, verifying connections, and reporting fraud communications.",
            "link": "https://sancharsaathi.gov.in/",
            "keywords": ["sanchar", "saathi", "mobile", "security", "telecom", "chakshu", "sim"]
        }),
        json!({
            "id": "seed-tool-6",
            "action": "File Cyber Complaint",
            "category": "Reporting",
            "categoryTag": "Government Official",
            "description": "Report cybercrimes, online fraud, and digital security incidents through the official National Cyber Crime Reporting Portal.",
            "link": "https://cybercrime.gov.in/",
            "keywords": ["report", "complaint", "cybercrime", "fraud", "crime", "file"]
        }),
        json!({
            "id": "seed-tool-7",
            "action": "Call Cyber Crime Helpline",
            "category": "Reporting",
            "categoryTag": "Emergency",
            "description": "Immediate assistance for cybercrime victims. Dial 1930 for the National Cyber Crime Helpline (available 24/7).",
            "link": "tel:1930",
            "keywords": ["helpline", "1930", "phone", "call", "emergency", "help"]
        }),
        json!({
            "id": "seed-tool-8",
            "action": "View Security Alerts",
            "category": "Security",
            "categoryTag": "Government Official",
            "description": "Stay updated with the latest cybersecurity alerts and advisories from CERT-In (Indian Computer Emergency Response Team).",
            "link": "https://www.cert-in.org.in/",
            "keywords": ["alert", "security", "cert", "advisory", "threat"]
        }),
        json!({
            "id": "seed-tool-9",
            "action": "Access DigiLocker",
            "category": "Identity Security",
            "categoryTag": "Government Official",
            "description": "Secure digital document storage platform by the Government of India. Store important documents safely in the cloud.",
            "link": "https://www.digilocker.gov.in/",
            "keywords": ["digilocker", "document", "identity", "storage", "cloud"]
        }),
    ];
    normalize_all(raw)
}

fn course(
    title: &str,
    kind: &str,
    duration: &str,
    level: &str,
    summary: &str,
    topics: [&str; 5],
    reference: (&str, &str),
) -> Value {
    json!({
        "title": title,
        "type": kind,
        "duration": duration,
        "level": level,
        "summary": summary,
        "topics": topics,
        "reference": { "text": reference.0, "link": reference.1 }
    })
}

/// Self-paced courses, workshops and tutorials.
pub fn courses() -> Vec<Item> {
    const CSK_ALERTS: &str = "https://www.csk.gov.in/alerts.html";
    let raw = vec![
        course(
            "Cybersecurity Fundamentals",
            "Course",
            "2-3 hours",
            "Beginner",
            "Learn the basics of cybersecurity, including common threats, attack vectors, and fundamental protection strategies.",
            [
                "Understanding cyber threats and vulnerabilities",
                "Basic security principles and best practices",
                "Password security and authentication",
                "Safe browsing and email practices",
                "Introduction to malware and how to avoid it",
            ],
            (
                "Comprehensive guide covering essential cybersecurity concepts",
                "https://www.geeksforgeeks.org/ethical-hacking/cyber-crime/",
            ),
        ),
        course(
            "Phishing Identification Workshop",
            "Workshop",
            "1 hour",
            "Beginner",
            "Hands-on workshop to identify and avoid phishing attacks through real-world examples and interactive exercises.",
            [
                "Recognizing phishing emails and messages",
                "Identifying suspicious links and attachments",
                "Social engineering tactics",
                "Reporting phishing attempts",
                "Creating strong security awareness",
            ],
            (
                "Interactive phishing simulation and training",
                "https://www.phishing.org/what-is-phishing",
            ),
        ),
        course(
            "Data Protection for Small Businesses",
            "Course",
            "3-4 hours",
            "Intermediate",
            "Comprehensive guide for small business owners to protect their data and customer information from cyber threats.",
            [
                "Data classification and inventory",
                "Access controls and user management",
                "Backup and recovery strategies",
                "Incident response planning",
                "Compliance and regulatory requirements",
            ],
            (
                "Small business cybersecurity framework",
                "https://cloudian.com/guides/data-protection/data-protection-and-privacy-7-ways-to-protect-user-data/",
            ),
        ),
        course(
            "Safe Online Banking Practices",
            "Tutorial",
            "1.5 hours",
            "Beginner",
            "Essential practices for secure online banking, UPI transactions, and digital payment security.",
            [
                "Secure online banking setup",
                "UPI safety and fraud prevention",
                "Mobile banking security",
                "Recognizing banking scams",
                "Two-factor authentication setup",
            ],
            (
                "Official banking security guidelines",
                "https://uppolice.gov.in/writereaddata/uploaded-content/Web_Page/23_6_2014_10_39_3_Online%20Banking%20Security.pdf",
            ),
        ),
        course(
            "Indian Cybersecurity Updates",
            "Resource",
            "Ongoing",
            "All Levels",
            "Stay updated with the latest cybersecurity threats and advisories from CERT-In and other official sources.",
            [
                "Current threat landscape in India",
                "Government cybersecurity initiatives",
                "Latest malware and attack trends",
                "Security advisories and updates",
                "Incident reporting procedures",
            ],
            ("Official CERT-In threat intelligence", CSK_ALERTS),
        ),
        course(
            "Mobile Security Essentials",
            "Course",
            "2 hours",
            "Beginner",
            "Learn how to secure your mobile devices, protect personal data, and avoid mobile-specific threats.",
            [
                "Mobile device security settings",
                "App security and permissions",
                "Public Wi-Fi safety",
                "Mobile malware prevention",
                "Secure mobile payments",
            ],
            ("Mobile security best practices guide", CSK_ALERTS),
        ),
    ];
    let raw = raw.into_iter().enumerate().map(|(i, mut course)| {
        course["id"] = json!(format!("seed-course-{}", i + 1));
        course
    });
    normalize_all(raw)
}

/// Sanchar Saathi information cards.
pub fn sanchar() -> Vec<Item> {
    let portal = "https://sancharsaathi.gov.in/";
    let raw = vec![
        json!({
            "id": "seed-sanchar-1",
            "title": "About Sanchar Saathi",
            "type": "Information",
            "summary": "Sanchar Saathi is a citizen-centric initiative by the Department of Telecommunications (DoT), Government of India. Launched in May 2023, it empowers mobile subscribers to secure their connections and increase awareness about telecom-related cyber threats.",
            "features": [
                "Launched by Department of Telecommunications (DoT)",
                "Citizen-centric initiative for mobile security",
                "Available in multiple Indian languages",
                "Free to use for all mobile subscribers"
            ],
            "reference": { "text": "Official Sanchar Saathi portal", "link": portal }
        }),
        json!({
            "id": "seed-sanchar-2",
            "title": "Key Features",
            "type": "Features",
            "summary": "Comprehensive set of tools to help citizens secure their mobile connections and report telecom fraud.",
            "features": [
                "Chakshu: Report Suspected Fraud Communications",
                "Block Lost/Stolen Mobile Handset",
                "Know Mobile Connections in Your Name",
                "Know Genuineness of Your Mobile Handset",
                "Report Incoming International Call with Indian Number",
                "Know Your Wireline Internet Service Provider"
            ],
            "reference": { "text": "Complete feature guide", "link": portal }
        }),
        json!({
            "id": "seed-sanchar-3",
            "title": "Impact Statistics",
            "type": "Impact",
            "summary": "Significant impact in securing mobile connections and reducing telecom fraud across India.",
            "features": [
                "Recovered over 5.35 lakh lost or stolen mobile handsets",
                "Disconnected more than 1 crore unauthorized mobile connections",
                "Deactivated over 29 lakh mobile numbers flagged through Chakshu",
                "Over 16.7 crore visits to the Sanchar Saathi portal"
            ],
            "reference": { "text": "Official impact report", "link": portal }
        }),
        json!({
            "id": "seed-sanchar-4",
            "title": "Download the App",
            "type": "Download",
            "summary": "The Sanchar Saathi app is available for Android and iOS, with features accessible in multiple Indian languages.",
            "features": [
                "Available on Google Play Store and Apple App Store",
                "Supports multiple Indian languages",
                "Free to download and use",
                "Regular updates with new features"
            ],
            "reference": { "text": "Download from official stores", "link": portal }
        }),
    ];
    normalize_all(raw)
}

/// Seed items for a collection, empty for collections without any.
pub fn for_collection(name: &str) -> Vec<Item> {
    match name {
        "events" => events(),
        "news" => news(),
        "tools" => tools(),
        "courses" => courses(),
        "sancharSaathi" => sanchar(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_sentinels() {
        let events = events();
        let news = news();
        assert_eq!(events.len(), 8);
        assert_eq!(news.len(), 6);
        assert!(events.iter().all(|e| e.id.starts_with("seed-event-")));
        assert!(news.iter().all(|n| n.id.starts_with("seed-news-")));
    }

    #[test]
    fn goa_news_comes_first() {
        let regions: Vec<_> = news().into_iter().map(|n| n.region).collect();
        let first_india = regions.iter().position(|r| r == "India").unwrap();
        assert!(regions[..first_india].iter().all(|r| r == "Goa"));
        assert!(regions[first_india..].iter().all(|r| r == "India"));
    }

    #[test]
    fn unknown_collections_have_no_seed() {
        assert!(for_collection("dashboardTasks").is_empty());
        assert_eq!(for_collection("events").len(), 8);
        assert_eq!(for_collection("tools").len(), 9);
        assert_eq!(for_collection("courses").len(), 6);
        assert_eq!(for_collection("sancharSaathi").len(), 4);
    }

    #[test]
    fn tool_directory_is_searchable_by_keyword() {
        use crate::filter::{apply, CategoryField, FilterSpec};

        let tools = tools();
        assert!(tools.iter().all(|t| t.reference.is_some() && !t.keywords.is_empty()));
        let hits = apply(&tools, &FilterSpec::Search("ceir".into()), CategoryField::Category);
        let titles: Vec<_> = hits.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["Block Stolen Phone"]);
        let telecom = apply(&tools, &FilterSpec::from_token("telecom hub"), CategoryField::Category);
        assert_eq!(telecom.len(), 3);
    }

    #[test]
    fn courses_and_info_cards_carry_their_lists() {
        assert!(courses().iter().all(|c| c.details.len() == 5 && c.reference_label.is_some()));
        let download = sanchar().into_iter().find(|c| c.kind == "Download").unwrap();
        assert_eq!(download.details.len(), 4);
    }
}
