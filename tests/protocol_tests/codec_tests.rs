//! Codec Tests
//!
//! Tests for command argument encoding/decoding and payload decoding.

use zset_client::protocol::{
    decode_average, decode_columns, decode_command, decode_flag, decode_int, decode_pair_map,
    decode_pairs, encode_command, parse_score, Bound, Command, CommandType, Member,
};
use zset_client::{DecodeError, ScoreDecoding};

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Command Encoding Tests
// =============================================================================

#[test]
fn test_encode_zset() {
    let cmd = Command::ZSet {
        name: "board",
        key: "alice",
        score: -42,
    };
    assert_eq!(cmd.name(), "zset");
    assert_eq!(encode_command(&cmd), tokens(&["board", "alice", "-42"]));
}

#[test]
fn test_encode_unbounded_as_empty_token() {
    let cmd = Command::ZCount {
        name: "board",
        start: Bound::Unbounded,
        end: Bound::Value(15),
    };
    assert_eq!(encode_command(&cmd), tokens(&["board", "", "15"]));
}

#[test]
fn test_encode_zscan_argument_order() {
    let cmd = Command::ZScan {
        name: "board",
        key_start: "b",
        start: Bound::Value(10),
        end: Bound::Unbounded,
        limit: 25,
    };
    assert_eq!(encode_command(&cmd), tokens(&["board", "b", "10", "", "25"]));
}

#[test]
fn test_encode_multi_zset_flattens_pairs() {
    let cmd = Command::MultiZSet {
        name: "board",
        entries: vec![("a", 1), ("b", 2)],
    };
    assert_eq!(
        encode_command(&cmd),
        tokens(&["board", "a", "1", "b", "2"])
    );
}

#[test]
fn test_encode_multi_zdel_carries_set_name() {
    let cmd = Command::MultiZDel {
        name: "board",
        keys: vec!["a", "b"],
    };
    assert_eq!(cmd.name(), "multi_zdel");
    assert_eq!(encode_command(&cmd), tokens(&["board", "a", "b"]));
}

#[test]
fn test_encode_zlist_has_no_set_name() {
    let cmd = Command::ZList {
        name_start: "",
        name_end: "z",
        limit: 10,
    };
    assert_eq!(encode_command(&cmd), tokens(&["", "z", "10"]));
}

// =============================================================================
// Command Decoding Tests
// =============================================================================

#[test]
fn test_decode_zset() {
    let args = tokens(&["board", "alice", "7"]);
    let cmd = decode_command("zset", &args).unwrap();
    assert_eq!(
        cmd,
        Command::ZSet {
            name: "board",
            key: "alice",
            score: 7
        }
    );
}

#[test]
fn test_decode_name_is_case_insensitive() {
    let args = tokens(&["board"]);
    let cmd = decode_command("ZSIZE", &args).unwrap();
    assert_eq!(cmd.command_type(), CommandType::ZSize);
}

#[test]
fn test_decode_bounds() {
    let args = tokens(&["board", "", "-3"]);
    match decode_command("zsum", &args).unwrap() {
        Command::ZSum { start, end, .. } => {
            assert_eq!(start, Bound::Unbounded);
            assert_eq!(end, Bound::Value(-3));
        }
        other => panic!("Expected ZSUM command, got {:?}", other),
    }
}

#[test]
fn test_decode_every_encoded_command() {
    let commands = vec![
        Command::ZGet { name: "n", key: "k" },
        Command::ZIncr {
            name: "n",
            key: "k",
            by: -5,
        },
        Command::ZrScan {
            name: "n",
            key_start: "k",
            start: Bound::Value(9),
            end: Bound::Value(1),
            limit: 3,
        },
        Command::ZRRange {
            name: "n",
            offset: 2,
            limit: 4,
        },
        Command::ZRemRangeByRank {
            name: "n",
            start: Bound::Value(0),
            end: Bound::Unbounded,
        },
        Command::ZPopBack { name: "n", limit: 1 },
        Command::MultiZGet {
            name: "n",
            keys: vec!["a", "b", "c"],
        },
    ];

    for cmd in commands {
        let args = encode_command(&cmd);
        let decoded = decode_command(cmd.name(), &args).unwrap();
        assert_eq!(decoded, cmd);
    }
}

#[test]
fn test_decode_unknown_command() {
    let result = decode_command("zfrobnicate", &[]);
    assert_eq!(
        result.unwrap_err(),
        DecodeError::UnknownCommand {
            name: "zfrobnicate".to_string()
        }
    );
}

#[test]
fn test_decode_wrong_argument_count() {
    let args = tokens(&["board"]);
    let err = decode_command("zget", &args).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::ArgumentCount {
            command: "zget",
            expected: 2,
            got: 1
        }
    ));
}

#[test]
fn test_decode_multi_zset_odd_entries() {
    let args = tokens(&["board", "a", "1", "b"]);
    let err = decode_command("multi_zset", &args).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnpairedArgument {
            command: "multi_zset",
            key: "b".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "multi_zset expects key/score pairs, key \"b\" has no score"
    );
}

#[test]
fn test_decode_invalid_integer() {
    let args = tokens(&["board", "a", "ten"]);
    let err = decode_command("zset", &args).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InvalidInteger {
            token: "ten".to_string()
        }
    );
}

#[test]
fn test_decode_negative_limit_rejected() {
    let args = tokens(&["board", "0", "-1"]);
    assert!(decode_command("zrange", &args).is_err());
}

// =============================================================================
// Score Coercion Tests
// =============================================================================

#[test]
fn test_parse_score_strict() {
    assert_eq!(parse_score("12", ScoreDecoding::Strict), Ok(12));
    assert_eq!(parse_score("-7", ScoreDecoding::Strict), Ok(-7));
    assert_eq!(
        parse_score("abc", ScoreDecoding::Strict),
        Err(DecodeError::InvalidScore {
            token: "abc".to_string()
        })
    );
}

#[test]
fn test_parse_score_lenient_zeroes_garbage() {
    assert_eq!(parse_score("abc", ScoreDecoding::Lenient), Ok(0));
    assert_eq!(parse_score("", ScoreDecoding::Lenient), Ok(0));
    assert_eq!(parse_score("5", ScoreDecoding::Lenient), Ok(5));
}

#[test]
fn test_decode_int_missing_token() {
    assert_eq!(
        decode_int(&[], ScoreDecoding::Strict),
        Err(DecodeError::MissingToken { index: 0 })
    );
}

#[test]
fn test_decode_flag() {
    assert_eq!(decode_flag(&tokens(&["1"])), Ok(true));
    assert_eq!(decode_flag(&tokens(&["0"])), Ok(false));
    assert!(decode_flag(&[]).is_err());
}

#[test]
fn test_decode_average() {
    assert_eq!(decode_average(&tokens(&["2.5"]), ScoreDecoding::Strict), Ok(2.5));
    assert!(decode_average(&tokens(&["n/a"]), ScoreDecoding::Strict).is_err());
    assert_eq!(decode_average(&tokens(&["n/a"]), ScoreDecoding::Lenient), Ok(0.0));
}

// =============================================================================
// Pair Decoding Tests
// =============================================================================

#[test]
fn test_decode_pairs_keeps_order() {
    let payload = tokens(&["c", "30", "a", "10", "b", "20"]);
    let members = decode_pairs(&payload, ScoreDecoding::Strict).unwrap();
    assert_eq!(
        members,
        vec![Member::new("c", 30), Member::new("a", 10), Member::new("b", 20)]
    );
}

#[test]
fn test_decode_pairs_reads_each_paired_score() {
    // Every score must come from the token right after its key.
    let payload = tokens(&["z", "9", "y", "8", "x", "7"]);
    let members = decode_pairs(&payload, ScoreDecoding::Strict).unwrap();
    let scores: Vec<i64> = members.iter().map(|m| m.score).collect();
    assert_eq!(scores, vec![9, 8, 7]);
}

#[test]
fn test_decode_pairs_ignores_trailing_token() {
    let payload = tokens(&["a", "1", "b", "2", "orphan"]);
    let members = decode_pairs(&payload, ScoreDecoding::Strict).unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[1], Member::new("b", 2));
}

#[test]
fn test_decode_pairs_empty_payload() {
    assert!(decode_pairs(&[], ScoreDecoding::Strict).unwrap().is_empty());
}

#[test]
fn test_decode_pairs_strict_rejects_bad_score() {
    let payload = tokens(&["a", "1", "b", "oops"]);
    assert!(decode_pairs(&payload, ScoreDecoding::Strict).is_err());

    let members = decode_pairs(&payload, ScoreDecoding::Lenient).unwrap();
    assert_eq!(members[1], Member::new("b", 0));
}

#[test]
fn test_decode_pair_map() {
    let payload = tokens(&["a", "1", "b", "2"]);
    let map = decode_pair_map(&payload, ScoreDecoding::Strict).unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 1);
    assert_eq!(map["b"], 2);
}

#[test]
fn test_decode_columns() {
    let payload = tokens(&["b", "2", "a", "1", "x"]);
    let (keys, scores) = decode_columns(&payload, ScoreDecoding::Strict).unwrap();
    assert_eq!(keys, tokens(&["b", "a"]));
    assert_eq!(scores, vec![2, 1]);
}
