//! Static club profile served at `/about`.

use serde_json::{Value, json};

/// The club profile. Static content, no store round-trip.
pub fn club_profile() -> Value {
    json!({
        "name": "CyberClub",
        "description": "A student club dedicated to hands-on cybersecurity: \
            CTF practice, workshops, and a community of people who enjoy \
            taking systems apart to understand how to defend them.",
        "founded": "2015",
        "mission": "Teach practical security skills through workshops and \
            challenges, build a welcoming infosec community, and prepare \
            members for CTF competitions and security careers.",
        "departments": [
            {
                "name": "Technical Department",
                "description": "Builds and maintains the club's platforms and \
                    tooling, and designs CTF challenges."
            },
            {
                "name": "Events Department",
                "description": "Plans workshops, talks, and the annual CTF."
            },
            {
                "name": "Communication Department",
                "description": "Runs the club's social channels and keeps \
                    members up to date."
            }
        ],
        "activities": [
            "Annual Capture The Flag competition",
            "Weekly workshops and training sessions",
            "Beginner bootcamp each autumn",
            "Participation in international CTF events"
        ],
        "contact": {
            "website": "https://cyberclub.example.org",
            "email": "board@cyberclub.example.org"
        }
    })
}
