// The fields of a polling station data entry, in the order of the paper tally sheet.

use std::fmt::Display;

use crate::config::FieldPath;

pub const VOTERS_COUNTS: [&str; 4] = [
    "data.voters_counts.poll_card_count",
    "data.voters_counts.proxy_certificate_count",
    "data.voters_counts.voter_card_count",
    "data.voters_counts.total_admitted_voters_count",
];

pub const VOTES_COUNTS: [&str; 4] = [
    "data.votes_counts.votes_candidates_counts",
    "data.votes_counts.blank_votes_count",
    "data.votes_counts.invalid_votes_count",
    "data.votes_counts.total_votes_cast_count",
];

pub const DIFFERENCES_COUNTS: [&str; 7] = [
    "data.differences_counts.more_ballots_count",
    "data.differences_counts.fewer_ballots_count",
    "data.differences_counts.unreturned_ballots_count",
    "data.differences_counts.too_few_ballots_handed_out_count",
    "data.differences_counts.too_many_ballots_handed_out_count",
    "data.differences_counts.other_explanation_count",
    "data.differences_counts.no_explanation_count",
];

/// One screen of the data entry workflow.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum FormSection {
    /// Admitted voters and votes cast.
    VotersAndVotes,
    /// Explanation of the differences between the two.
    Differences,
}

impl FormSection {
    /// The sections in workflow order.
    pub const ALL: [FormSection; 2] = [FormSection::VotersAndVotes, FormSection::Differences];

    pub fn fields(&self) -> Vec<FieldPath> {
        match self {
            FormSection::VotersAndVotes => VOTERS_COUNTS
                .iter()
                .chain(VOTES_COUNTS.iter())
                .map(|s| FieldPath::from(*s))
                .collect(),
            FormSection::Differences => DIFFERENCES_COUNTS
                .iter()
                .map(|s| FieldPath::from(*s))
                .collect(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            FormSection::VotersAndVotes => "Admitted voters and votes cast",
            FormSection::Differences => "Differences between admitted voters and votes cast",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormSection::VotersAndVotes => "voters_and_votes",
            FormSection::Differences => "differences",
        }
    }

    /// The section that follows this one, if any.
    pub fn next(&self) -> Option<FormSection> {
        match self {
            FormSection::VotersAndVotes => Some(FormSection::Differences),
            FormSection::Differences => None,
        }
    }
}

impl Display for FormSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections() {
        assert_eq!(FormSection::Differences.fields().len(), 7);
        assert_eq!(FormSection::VotersAndVotes.fields().len(), 8);
        assert_eq!(FormSection::VotersAndVotes.next(), Some(FormSection::Differences));
    }
}
