use circl_cve_client::{ClientConfig, LogLevel, ServiceClient};
use serde_json::{Value, json};
use wiremock::MockServer;

/// A client whose CIRCL and NVD base URLs both point at `server`.
pub fn client_for(server: &MockServer) -> ServiceClient {
    let mut config = ClientConfig::with_base_url(&server.uri());
    config.user_agent = "circl-cve-integration-tests".to_string();
    config.log_level = LogLevel::Debug;
    ServiceClient::new(config)
}

/// Same as [`client_for`], but with the default empty `User-Agent`.
pub fn anonymous_client_for(server: &MockServer) -> ServiceClient {
    ServiceClient::new(ClientConfig::with_base_url(&server.uri()))
}

pub fn cve_json(id: &str) -> Value {
    json!({
        "Modified": "2019-10-03T00:15:00",
        "Published": "2018-08-28T08:29:00",
        "access": {"authentication": "NONE", "complexity": "MEDIUM", "vector": "NETWORK"},
        "assigner": "cve@mitre.org",
        "capec": [{
            "id": "13",
            "name": "Subverting Environment Variable Values",
            "prerequisites": "",
            "related_weakness": ["200"],
            "solutions": "",
            "summary": ""
        }],
        "cvss": 4.3,
        "cvss-time": "2019-10-03T00:15:00",
        "cvss-vector": "AV:N/AC:M/Au:N/C:P/I:N/A:N",
        "cwe": "CWE-200",
        "id": id,
        "impact": {"availability": "NONE", "confidentiality": "PARTIAL", "integrity": "NONE"},
        "references": ["http://seclists.org/oss-sec/2018/q3/180"],
        "refmap": {"bid": ["105163"], "confirm": [], "misc": []},
        "summary": "Remotely observable behaviour in auth-gss2.c in OpenSSH through 7.8.",
        "vulnerable_configuration": [],
        "vulnerable_configuration_cpe_2_2": [],
        "vulnerable_product": ["cpe:2.3:a:openbsd:openssh:7.8:*:*:*:*:*:*:*"]
    })
}

pub fn capec_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "prerequisites": "An environment variable is accessible to the user.",
        "related_weakness": ["353", "285", "302", "74", "15", "73", "20", "200"],
        "solutions": "Protect environment variables against unauthorized read and write access.",
        "summary": "The attacker directly or indirectly modifies environment variables."
    })
}

/// A small CWE enumeration; CIRCL repeats each description's leading text.
pub fn cwe_list_json() -> Value {
    json!([
        {
            "Description": "The software does not validate input. Bad things follow. The software does not validate input. Bad things follow.",
            "id": "20",
            "name": "Improper Input Validation",
            "status": "Stable",
            "weaknessabs": "Class"
        },
        {
            "Description": "Information is exposed. Information is exposed.",
            "id": "200",
            "name": "Exposure of Sensitive Information to an Unauthorized Actor",
            "status": "Draft",
            "weaknessabs": "Class"
        },
        {
            "Description": "Environment variables are changed. Environment variables are changed.",
            "id": "15",
            "name": "External Control of System or Configuration Setting",
            "status": "Incomplete",
            "weaknessabs": "Base"
        }
    ])
}

pub fn nvd_cpe_json(cpe23_uri: &str) -> Value {
    json!({
        "resultsPerPage": 1,
        "startIndex": 0,
        "totalResults": 1,
        "result": {
            "dataType": "CPE",
            "feedVersion": "1.0",
            "cpeCount": 1,
            "feedTimestamp": "2021-03-01T12:00Z",
            "cpes": [{
                "deprecated": false,
                "cpe23Uri": cpe23_uri,
                "lastModifiedDate": "2019-06-10T17:56Z",
                "titles": [{"title": "OpenBSD OpenSSH 7.5", "lang": "en_US"}],
                "refs": [],
                "deprecatedBy": [],
                "vulnerabilities": ["CVE-2018-15919"]
            }]
        }
    })
}

pub fn nvd_empty_json() -> Value {
    json!({
        "resultsPerPage": 0,
        "startIndex": 0,
        "totalResults": 0,
        "result": {
            "dataType": "CPE",
            "feedVersion": "1.0",
            "cpeCount": 0,
            "feedTimestamp": "2021-03-01T12:00Z",
            "cpes": []
        }
    })
}
