//! Subject-code labels — the fixed set of boolean flags on a subject code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One of the dataset's subject-code flags.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Label {
  TverrfagligEksamen,
  ForMontessori,
  ForPrivatskoler,
  ForSteiner,
  Forsoek,
  Avviksfag,
  DoveTunghorte,
  ForDenTyskeSkolen,
  ForVoksenopplaering,
  GrunnleggendeNorsk,
  KortBotid,
  KunnskapsloftetSamisk,
  LaerefagMedFordypningsomraader,
  Laerling,
  LokaltOmfang,
  MerkelappFinsk,
  Morsmaal,
  Paabygg,
  Saerlop,
  Valgfag,
  VerneverdigTradisjonshaandverk,
}

impl Label {
  /// Look up a label by its raw dataset code. Unknown codes return `None`
  /// and are skipped (with a warning) during normalization.
  pub fn from_code(code: &str) -> Option<Label> {
    match code {
      "tverrfaglig_eksamen" => Some(Self::TverrfagligEksamen),
      "for_montessori" => Some(Self::ForMontessori),
      "for_privatskoler" => Some(Self::ForPrivatskoler),
      "for_steiner" => Some(Self::ForSteiner),
      "forsoek" => Some(Self::Forsoek),
      "avviksfag" => Some(Self::Avviksfag),
      "dove_tunghorte" => Some(Self::DoveTunghorte),
      "for_den_tyske_skolen" => Some(Self::ForDenTyskeSkolen),
      "for_voksenopplaering" => Some(Self::ForVoksenopplaering),
      "grunnleggende_norsk" => Some(Self::GrunnleggendeNorsk),
      "kort_botid" => Some(Self::KortBotid),
      "kunnskapsloftet_samisk" => Some(Self::KunnskapsloftetSamisk),
      "laerefag_med_fordypningsomraader" => {
        Some(Self::LaerefagMedFordypningsomraader)
      }
      "laerling" => Some(Self::Laerling),
      "lokalt_omfang" => Some(Self::LokaltOmfang),
      "merkelapp_finsk" => Some(Self::MerkelappFinsk),
      "morsmaal" => Some(Self::Morsmaal),
      "paabygg" => Some(Self::Paabygg),
      "saerlop" => Some(Self::Saerlop),
      "valgfag" => Some(Self::Valgfag),
      "verneverdig_tradisjonshaandverk" => {
        Some(Self::VerneverdigTradisjonshaandverk)
      }
      _ => None,
    }
  }
}

/// The folded label map of a subject code. A raw pair with an absent boolean
/// defaults to `true`.
pub type Labels = BTreeMap<Label, bool>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn known_codes_round_trip_through_serde_names() {
    // `from_code` must agree with the serde rename of each variant.
    for code in [
      "tverrfaglig_eksamen",
      "for_voksenopplaering",
      "laerefag_med_fordypningsomraader",
      "verneverdig_tradisjonshaandverk",
    ] {
      let label = Label::from_code(code).unwrap();
      let json = serde_json::to_value(label).unwrap();
      assert_eq!(json, serde_json::Value::String(code.to_string()));
    }
  }

  #[test]
  fn unknown_code_is_none() {
    assert_eq!(Label::from_code("helt_ukjent"), None);
  }
}
