//! JSON shapes exchanged with the audit server and their conversion into the
//! validated domain model.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use arlo_core::AuditError;
use arlo_core::model::{
    Audit, Choice, ChoiceId, Contest, ContestId, EndMeasurements, Jurisdiction, JurisdictionId,
    Round, RoundContest, RoundNumber,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatusDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub risk_limit: Option<u32>,
    #[serde(default)]
    pub random_seed: Option<String>,
    #[serde(default)]
    pub contests: Vec<ContestDto>,
    #[serde(default)]
    pub jurisdictions: Vec<JurisdictionDto>,
    #[serde(default)]
    pub rounds: Vec<RoundDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub total_ballots_cast: Option<u64>,
    #[serde(default)]
    pub choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub num_votes: u64,
}

#[derive(Debug, Deserialize)]
pub struct JurisdictionDto {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundDto {
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub contests: Vec<RoundContestDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundContestDto {
    pub id: String,
    #[serde(default)]
    pub sample_size: Option<u32>,
    #[serde(default)]
    pub end_measurements: Option<EndMeasurementsDto>,
}

/// Sent as an object of nulls while a round awaits results.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndMeasurementsDto {
    #[serde(default)]
    pub pvalue: Option<f64>,
    #[serde(default)]
    pub is_complete: Option<bool>,
}

/// Body of an error response: `{"errors": [{"errorType": ..., "message": ...}]}`.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorItem {
    #[serde(default)]
    pub error_type: Option<String>,
    pub message: String,
}

impl ErrorBody {
    /// First server-provided message, if the body has the expected shape.
    #[must_use]
    pub fn first_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()?
            .errors
            .into_iter()
            .next()
            .map(|item| item.message)
    }
}

impl AuditStatusDto {
    /// Validates the response and converts it into an `Audit`.
    ///
    /// # Errors
    ///
    /// Returns `AuditError` when the response does not describe a usable audit.
    pub fn into_audit(self) -> Result<Audit, AuditError> {
        let risk_limit = self.risk_limit.ok_or(AuditError::MissingRiskLimit)?;

        let contests = self
            .contests
            .into_iter()
            .map(ContestDto::into_contest)
            .collect::<Result<Vec<_>, _>>()?;

        let jurisdictions = self
            .jurisdictions
            .into_iter()
            .map(|j| Jurisdiction::new(JurisdictionId::new(j.id), j.name))
            .collect();

        let rounds = self
            .rounds
            .into_iter()
            .enumerate()
            .map(|(index, round)| round.into_round(RoundNumber::from_index(index)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Audit::new(risk_limit, jurisdictions, contests, rounds)?
            .with_name(self.name)
            .with_random_seed(self.random_seed))
    }
}

impl ContestDto {
    fn into_contest(self) -> Result<Contest, AuditError> {
        let choices = self
            .choices
            .into_iter()
            .map(|c| Choice::new(ChoiceId::new(c.id), c.name, c.num_votes))
            .collect();
        Contest::new(
            ContestId::new(self.id),
            self.name,
            self.total_ballots_cast,
            choices,
        )
    }
}

impl RoundDto {
    fn into_round(self, number: RoundNumber) -> Result<Round, AuditError> {
        let started_at = parse_timestamp(number, self.started_at)?;
        let ended_at = parse_timestamp(number, self.ended_at)?;
        let contests = self
            .contests
            .into_iter()
            .map(|c| {
                let measurements = c.end_measurements.map(|m| {
                    EndMeasurements::new(m.pvalue, m.is_complete.unwrap_or(false))
                });
                RoundContest::new(ContestId::new(c.id), c.sample_size, measurements)
            })
            .collect();
        Ok(Round::new(contests).with_timestamps(started_at, ended_at))
    }
}

fn parse_timestamp(
    round: RoundNumber,
    raw: Option<String>,
) -> Result<Option<NaiveDateTime>, AuditError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.naive_utc()));
    }
    raw.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(Some)
        .map_err(|_| AuditError::InvalidTimestamp { round, raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use arlo_core::rounds::derive_round_states;

    const STATUS: &str = r#"{
        "name": "County audit",
        "riskLimit": 5,
        "randomSeed": "1234567890",
        "contests": [{
            "id": "contest-1",
            "name": "Mayor",
            "totalBallotsCast": 1000,
            "choices": [
                {"id": "candidate-1", "name": "Alice", "numVotes": 600},
                {"id": "candidate-2", "name": "Bob", "numVotes": 400}
            ]
        }],
        "jurisdictions": [{"id": "jur-1", "name": "County", "auditBoards": []}],
        "rounds": [
            {
                "startedAt": "2019-10-01T12:00:00.123456",
                "endedAt": "2019-10-01T13:00:00",
                "contests": [{"id": "contest-1", "sampleSize": 80,
                    "endMeasurements": {"pvalue": 0.2, "isComplete": false}}]
            },
            {
                "startedAt": "2019-10-02T09:00:00+00:00",
                "endedAt": null,
                "contests": [{"id": "contest-1", "sampleSize": 120,
                    "endMeasurements": {"pvalue": null, "isComplete": null}}]
            }
        ]
    }"#;

    fn parse(json: &str) -> Result<Audit, AuditError> {
        serde_json::from_str::<AuditStatusDto>(json)
            .expect("well-formed json")
            .into_audit()
    }

    #[test]
    fn status_converts_into_audit() {
        let audit = parse(STATUS).unwrap();
        assert_eq!(audit.name(), Some("County audit"));
        assert_eq!(audit.risk_limit(), 5);
        assert_eq!(audit.first_jurisdiction().unwrap().id().as_str(), "jur-1");
        assert_eq!(audit.primary_contest().unwrap().choices()[1].name(), "Bob");
        assert_eq!(audit.rounds().len(), 2);
        assert!(audit.rounds()[0].started_at().is_some());
        assert!(audit.rounds()[1].ended_at().is_none());
    }

    #[test]
    fn null_measurement_fields_mean_awaiting_results() {
        let audit = parse(STATUS).unwrap();
        let states = derive_round_states(&audit);
        assert!(!states[0].show_calculate_button);
        assert!(states[1].show_calculate_button);
        assert_eq!(states[1].pvalue, None);
        assert_eq!(states[1].sample_size, Some(120));
    }

    #[test]
    fn missing_measurements_mean_pending() {
        let audit = parse(
            r#"{"riskLimit": 10, "contests": [{"id": "c", "choices": [{"id": "a"}, {"id": "b"}]}],
                "rounds": [{"contests": [{"id": "c", "sampleSize": 5}]}]}"#,
        )
        .unwrap();
        assert!(!derive_round_states(&audit)[0].show_calculate_button);
    }

    #[test]
    fn sparse_status_is_accepted() {
        let audit = parse(r#"{"riskLimit": 10}"#).unwrap();
        assert!(audit.rounds().is_empty());
        assert!(audit.contests().is_empty());
    }

    #[test]
    fn malformed_status_is_rejected() {
        assert_eq!(parse(r#"{"riskLimit": null}"#), Err(AuditError::MissingRiskLimit));
        assert_eq!(parse(r#"{"riskLimit": 0}"#), Err(AuditError::InvalidRiskLimit(0)));
        assert!(matches!(
            parse(r#"{"riskLimit": 5, "contests": [{"id": "c", "choices": [{"id": "a"}]}]}"#),
            Err(AuditError::TooFewChoices { count: 1, .. })
        ));
        assert!(matches!(
            parse(r#"{"riskLimit": 5, "rounds": [{"contests": [{"id": "ghost"}]}]}"#),
            Err(AuditError::UnknownContest { .. })
        ));
        assert!(matches!(
            parse(
                r#"{"riskLimit": 5, "contests": [{"id": "c", "choices": [{"id": "a"}, {"id": "b"}]}],
                    "rounds": [{"contests": [{"id": "c", "endMeasurements": {"pvalue": 1.5}}]}]}"#
            ),
            Err(AuditError::InvalidPValue { .. })
        ));
        assert!(matches!(
            parse(r#"{"riskLimit": 5, "rounds": [{"startedAt": "yesterday"}]}"#),
            Err(AuditError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let body = r#"{"errors": [{"errorType": "Bad Request", "message": "Invalid results"}]}"#;
        assert_eq!(ErrorBody::first_message(body).as_deref(), Some("Invalid results"));
        assert_eq!(ErrorBody::first_message("<html>oops</html>"), None);
        assert_eq!(ErrorBody::first_message(r#"{"errors": []}"#), None);
    }
}
