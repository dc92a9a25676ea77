//! Fixed sample lead data
//!
//! Used by the simulated callback route and by the poll client's `send`
//! command to exercise the receiver without a real enrichment partner.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::time;

/// Message attached to simulated callback records
pub const SIMULATED_MESSAGE: &str = "This is simulated data for testing purposes";

/// One callback record as the enrichment partner sends it back:
/// a batch of leads together with the query that produced them
pub fn simulated_callback(at: DateTime<Utc>) -> Value {
    let timestamp = time::to_iso(&at);
    json!({
        "leads": [
            {
                "id": "lead1",
                "name": "John Smith",
                "title": "CEO",
                "company": "Acme Technologies",
                "location": "San Francisco, CA",
                "email": "john@acmetech.com",
                "phone": "+1 (555) 123-4567",
                "linkedin": "https://linkedin.com/in/johnsmith"
            },
            {
                "id": "lead2",
                "name": "Sarah Johnson",
                "title": "CTO",
                "company": "Innovate Solutions",
                "location": "New York, NY",
                "email": "sarah@innovatesolutions.com",
                "phone": "+1 (555) 987-6543",
                "linkedin": "https://linkedin.com/in/sarahjohnson"
            },
            {
                "id": "lead3",
                "name": "Michael Chen",
                "title": "VP of Sales",
                "company": "Global Partners",
                "location": "Chicago, IL",
                "email": "michael@globalpartners.com",
                "phone": "+1 (555) 456-7890",
                "linkedin": "https://linkedin.com/in/michaelchen"
            }
        ],
        "query": {
            "companySize": "51-200",
            "industry": "Technology",
            "jobLevels": ["c_level", "vp"]
        },
        "timestamp": timestamp,
        "message": SIMULATED_MESSAGE
    })
}

/// A batch of individual lead records, one record per lead
pub fn lead_batch(at: DateTime<Utc>) -> Value {
    let timestamp = time::to_iso(&at);
    json!([
        {
            "name": "Jane Smith",
            "title": "CTO",
            "company": "TechCorp",
            "email": "jane.smith@techcorp.com",
            "phone": "+1-555-987-6543",
            "linkedin": "linkedin.com/in/janesmith",
            "industry": "Software",
            "location": "New York, NY",
            "companySize": "201-500",
            "revenue": "$50M-$100M",
            "notes": "Recently raised Series B funding",
            "timestamp": timestamp
        },
        {
            "name": "Michael Johnson",
            "title": "VP of Marketing",
            "company": "Growth Industries",
            "email": "michael.johnson@growth.co",
            "phone": "+1-555-456-7890",
            "linkedin": "linkedin.com/in/michaeljohnson",
            "industry": "Marketing",
            "location": "Austin, TX",
            "companySize": "51-200",
            "revenue": "$10M-$50M",
            "notes": "Looking for new marketing automation solutions",
            "timestamp": timestamp
        },
        {
            "name": "Sarah Williams",
            "title": "Head of Sales",
            "company": "Global Solutions Inc",
            "email": "sarah.w@globalsolutions.com",
            "phone": "+1-555-234-5678",
            "linkedin": "linkedin.com/in/sarahwilliams",
            "industry": "Business Services",
            "location": "Chicago, IL",
            "companySize": "1001-5000",
            "revenue": "$100M-$500M",
            "notes": "Expanding into European markets next quarter",
            "timestamp": timestamp
        }
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_callback_is_single_record() {
        let record = simulated_callback(time::now());
        assert!(record.is_object());
        assert_eq!(record["leads"].as_array().unwrap().len(), 3);
        assert_eq!(record["message"], SIMULATED_MESSAGE);
    }

    #[test]
    fn test_lead_batch_has_three_records() {
        let batch = lead_batch(time::now());
        assert_eq!(batch.as_array().unwrap().len(), 3);
        assert!(batch[0]["timestamp"].is_string());
    }
}
