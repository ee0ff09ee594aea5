/// One entry of the interface description
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub entry_type: EntryType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub inputs: Vec<AbiParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<AbiParam>,

    pub state_mutability: StateMutability,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Constructor,
    Function,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    View,
    NonPayable,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AbiParam {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    fn new(name: &str, param_type: &str) -> Self {
        AbiParam {
            name: name.to_owned(),
            param_type: param_type.to_owned(),
            components: vec![],
        }
    }
}

impl AbiEntry {
    fn function(
        name: &str,
        inputs: Vec<AbiParam>,
        outputs: Vec<AbiParam>,
        state_mutability: StateMutability,
    ) -> Self {
        AbiEntry {
            entry_type: EntryType::Function,
            name: Some(name.to_owned()),
            inputs,
            outputs,
            state_mutability,
        }
    }
}

/// Interface description of an election, in the shape of an Ethereum JSON ABI
pub fn interface() -> Vec<AbiEntry> {
    use StateMutability::*;

    let candidate = AbiParam {
        name: "".to_owned(),
        param_type: "tuple[]".to_owned(),
        components: vec![
            AbiParam::new("id", "uint256"),
            AbiParam::new("name", "string"),
            AbiParam::new("description", "string"),
            AbiParam::new("walletAddress", "address"),
            AbiParam::new("voteCount", "uint256"),
        ],
    };

    vec![
        AbiEntry {
            entry_type: EntryType::Constructor,
            name: None,
            inputs: vec![AbiParam::new("_votingDuration", "uint256")],
            outputs: vec![],
            state_mutability: NonPayable,
        },
        AbiEntry::function(
            "registerVoter",
            vec![AbiParam::new("_voter", "address")],
            vec![],
            NonPayable,
        ),
        AbiEntry::function(
            "addCandidate",
            vec![
                AbiParam::new("_name", "string"),
                AbiParam::new("_description", "string"),
                AbiParam::new("_walletAddress", "address"),
            ],
            vec![],
            NonPayable,
        ),
        AbiEntry::function(
            "changeStage",
            vec![AbiParam::new("_newStage", "uint8")],
            vec![],
            NonPayable,
        ),
        AbiEntry::function(
            "vote",
            vec![AbiParam::new("_candidateId", "uint256")],
            vec![],
            NonPayable,
        ),
        AbiEntry::function("getResults", vec![], vec![candidate], View),
        AbiEntry::function(
            "getTotalVoters",
            vec![],
            vec![AbiParam::new("", "uint256")],
            View,
        ),
        AbiEntry::function(
            "getTotalCandidates",
            vec![],
            vec![AbiParam::new("", "uint256")],
            View,
        ),
        AbiEntry::function(
            "currentStage",
            vec![],
            vec![AbiParam::new("", "uint8")],
            View,
        ),
        AbiEntry::function("owner", vec![], vec![AbiParam::new("", "address")], View),
        AbiEntry::function(
            "votingDeadline",
            vec![],
            vec![AbiParam::new("", "uint256")],
            View,
        ),
    ]
}
