//! split-engine CLI
//!
//! Compute balances and settlement plans for a group snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Net balance of every member
//! split-engine balances --input group.json
//!
//! # Suggested payments, as JSON
//! split-engine simplify --input group.json --format json
//!
//! # Split a single amount
//! split-engine split --amount 100 --members a,b,c --strategy shares --weights 1,1,2
//!
//! # Generate a random group for testing
//! split-engine generate --members 8 --expenses 40 --seed 7
//! ```

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use split_engine::allocation::split::{AllocatorConfig, RemainderPolicy, SplitAllocator, SplitMethod};
use split_engine::balance::aggregator::BalanceAggregator;
use split_engine::balance::summary::GroupSummary;
use split_engine::core::error::EngineError;
use split_engine::core::group::Group;
use split_engine::core::member::{Member, MemberId};
use split_engine::core::settlement::Settlement;
use split_engine::optimization::simplifier::DebtSimplifier;
use split_engine::simulation::generator::{generate_random_group, GeneratorConfig};
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-engine — shared expense balances and debt simplification

USAGE:
    split-engine <COMMAND> [OPTIONS]

COMMANDS:
    balances    Show the net balance of every group member
    simplify    Suggest payments that settle all balances
    summary     Show group totals and per-member activity
    split       Split a single amount among members
    generate    Generate a random group snapshot (for testing)
    help        Show this message

OPTIONS (balances, simplify, summary):
    --input <FILE>        Path to JSON group snapshot
    --format <FORMAT>     Output format: text (default) or json
    --seed <N>            Seed for distributing equal-split remainders

OPTIONS (split):
    --amount <AMOUNT>     Total to split
    --members <LIST>      Comma-separated member ids, in order
    --strategy <NAME>     equal (default), exact, percentage or shares
    --weights <LIST>      Per-member amounts, percentages or shares
    --seed <N>            Seed for distributing equal-split remainders

OPTIONS (generate):
    --members <N>         Number of members (default: 6)
    --expenses <N>        Number of expenses (default: 20)
    --settlements <N>     Number of settlements (default: 3)
    --seed <N>            Random seed (default: 42)
    --output <FILE>       Write to file instead of stdout

Set RUST_LOG=debug for engine diagnostics."#
    );
}

/// JSON schema for a group snapshot.
#[derive(Serialize, Deserialize)]
struct GroupFile {
    #[serde(default = "default_group_id")]
    id: String,
    #[serde(default)]
    name: String,
    members: Vec<Member>,
    #[serde(default)]
    expenses: Vec<ExpenseInput>,
    #[serde(default)]
    settlements: Vec<SettlementInput>,
}

fn default_group_id() -> String {
    "group".to_string()
}

#[derive(Serialize, Deserialize)]
struct ExpenseInput {
    payer: MemberId,
    #[serde(default)]
    description: String,
    amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    participants: Vec<MemberId>,
    split: SplitMethod,
}

#[derive(Serialize, Deserialize)]
struct SettlementInput {
    from: MemberId,
    to: MemberId,
    amount: Decimal,
}

#[derive(Serialize)]
struct BalanceOutput {
    member: String,
    name: String,
    balance: String,
    status: &'static str,
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn or_fail<T>(result: Result<T, EngineError>, context: &str) -> T {
    result.unwrap_or_else(|e| fail(format!("{}: {}", context, e)))
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn remainder_policy(seed: Option<u64>) -> RemainderPolicy {
    seed.map(RemainderPolicy::Seeded).unwrap_or_default()
}

fn load_group(path: &str, remainder: RemainderPolicy) -> Group {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("reading file '{}': {}", path, e)));

    let file: GroupFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "id": "trip",
  "members": [{{ "id": "a", "name": "Ana" }}, {{ "id": "b", "name": "Ben" }}],
  "expenses": [
    {{ "payer": "a", "amount": "90", "participants": ["a", "b"], "split": {{ "strategy": "EQUAL" }} }}
  ],
  "settlements": [{{ "from": "b", "to": "a", "amount": "20" }}]
}}"#
        );
        process::exit(1);
    });

    let allocator = SplitAllocator::new(AllocatorConfig { remainder });
    let today = Utc::now().date_naive();
    let mut group = Group::new(file.id, file.name);
    for member in file.members {
        or_fail(group.add_member(member), "adding member");
    }
    for (i, input) in file.expenses.into_iter().enumerate() {
        let context = format!("expense #{}", i + 1);
        let expense = or_fail(
            allocator.expense(
                input.payer,
                input.description,
                input.amount,
                input.date.unwrap_or(today),
                &input.split,
                &input.participants,
            ),
            &context,
        );
        or_fail(group.record_expense(expense), &context);
    }
    for (i, input) in file.settlements.into_iter().enumerate() {
        let context = format!("settlement #{}", i + 1);
        let settlement = or_fail(Settlement::new(input.from, input.to, input.amount), &context);
        or_fail(group.record_settlement(settlement), &context);
    }
    group
}

/// Options shared by the commands that read a group snapshot.
struct InputOptions {
    path: String,
    json: bool,
    seed: Option<u64>,
}

fn parse_input_options(args: &[String]) -> InputOptions {
    let mut path = None;
    let mut format = "text".to_string();
    let mut seed = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--input requires a file path")),
                );
            }
            "--format" => {
                i += 1;
                format = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--format requires 'text' or 'json'"));
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_number(args.get(i), "--seed"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    InputOptions {
        path: path.unwrap_or_else(|| fail("--input <FILE> is required")),
        json: format == "json",
        seed,
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<&String>, flag: &str) -> T {
    value
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| fail(format!("{} requires a number", flag)))
}

fn cmd_balances(args: &[String]) {
    let options = parse_input_options(args);
    let group = load_group(&options.path, remainder_policy(options.seed));
    let rows = BalanceAggregator::detailed_balances(&group);

    if options.json {
        let output: Vec<BalanceOutput> = rows
            .iter()
            .map(|row| BalanceOutput {
                member: row.member.to_string(),
                name: row.name.clone(),
                balance: row.balance.to_string(),
                status: if row.is_creditor() {
                    "CREDITOR"
                } else if row.is_debtor() {
                    "DEBTOR"
                } else {
                    "SETTLED"
                },
            })
            .collect();
        println!("{}", to_json(&output));
    } else {
        println!("=== Balances: {} ===", group.name());
        for row in &rows {
            println!("{}", row);
        }
    }
}

fn cmd_simplify(args: &[String]) {
    let options = parse_input_options(args);
    let group = load_group(&options.path, remainder_policy(options.seed));
    let balances = BalanceAggregator::compute_balances(&group);
    let plan = DebtSimplifier::simplify(&balances);

    if options.json {
        println!("{}", to_json(&plan));
    } else {
        let names = group.member_names();
        let name = |id: &MemberId| names.get(id).cloned().unwrap_or_else(|| id.to_string());
        println!("{}", plan);
        for payment in plan.payments() {
            println!(
                "{} pays {} {}",
                name(&payment.from),
                name(&payment.to),
                payment.amount
            );
        }
    }
}

fn cmd_summary(args: &[String]) {
    let options = parse_input_options(args);
    let group = load_group(&options.path, remainder_policy(options.seed));
    let summary = GroupSummary::from_group(&group);

    if options.json {
        println!("{}", to_json(&summary));
    } else {
        println!("{}", summary);
        for member in group.members() {
            let activity = summary.activity_of(&member.id);
            println!(
                "  {:<20} paid {:>10}  share {:>10}  net {:>10}",
                member.name,
                activity.paid,
                activity.owed_share,
                activity.net()
            );
        }
    }
}

fn cmd_split(args: &[String]) {
    let mut amount: Option<Decimal> = None;
    let mut members: Vec<MemberId> = Vec::new();
    let mut strategy = "equal".to_string();
    let mut weights: Vec<String> = Vec::new();
    let mut seed = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--amount" => {
                i += 1;
                amount = Some(parse_number(args.get(i), "--amount"));
            }
            "--members" => {
                i += 1;
                members = split_list(args.get(i), "--members")
                    .into_iter()
                    .map(MemberId::new)
                    .collect();
            }
            "--strategy" => {
                i += 1;
                strategy = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail("--strategy requires a name"));
            }
            "--weights" => {
                i += 1;
                weights = split_list(args.get(i), "--weights");
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_number(args.get(i), "--seed"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let amount = amount.unwrap_or_else(|| fail("--amount is required"));
    let strategy = strategy.to_lowercase();
    if strategy != "equal" && weights.len() != members.len() {
        fail("--weights must list one value per member");
    }

    let method = match strategy.as_str() {
        "equal" => SplitMethod::Equal,
        "exact" => SplitMethod::Exact(zip_weights(&members, &weights)),
        "percentage" => SplitMethod::Percentage(zip_weights(&members, &weights)),
        "shares" => SplitMethod::Shares(zip_weights(&members, &weights)),
        other => fail(format!("unknown strategy: {}", other)),
    };

    let allocator = SplitAllocator::new(AllocatorConfig {
        remainder: remainder_policy(seed),
    });
    let splits = or_fail(allocator.allocate(amount, &method, &members), "splitting");
    for split in &splits {
        println!("{:<20} {:>12}", split.member, split.amount);
    }
    let total: Decimal = splits.iter().map(|s| s.amount).sum();
    println!("{:<20} {:>12}", "TOTAL", total);
}

fn split_list(value: Option<&String>, flag: &str) -> Vec<String> {
    value
        .unwrap_or_else(|| fail(format!("{} requires a comma-separated list", flag)))
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn zip_weights<T: std::str::FromStr>(members: &[MemberId], weights: &[String]) -> HashMap<MemberId, T> {
    members
        .iter()
        .zip(weights)
        .map(|(m, w)| (m.clone(), parse_number(Some(w), "--weights")))
        .collect()
}

fn cmd_generate(args: &[String]) {
    let mut config = GeneratorConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                config.member_count = parse_number(args.get(i), "--members");
            }
            "--expenses" => {
                i += 1;
                config.expense_count = parse_number(args.get(i), "--expenses");
            }
            "--settlements" => {
                i += 1;
                config.settlement_count = parse_number(args.get(i), "--settlements");
            }
            "--seed" => {
                i += 1;
                config.seed = parse_number(args.get(i), "--seed");
            }
            "--output" => {
                i += 1;
                output_path = Some(
                    args.get(i)
                        .cloned()
                        .unwrap_or_else(|| fail("--output requires a file path")),
                );
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let group = or_fail(generate_random_group(&config), "generating group");

    // Expenses are written back as exact splits so the file reproduces the
    // generated balances regardless of the remainder policy used to load it.
    let file = GroupFile {
        id: group.id().to_string(),
        name: group.name().to_string(),
        members: group.members().to_vec(),
        expenses: group
            .expenses()
            .iter()
            .map(|e| ExpenseInput {
                payer: e.payer().clone(),
                description: e.description().to_string(),
                amount: e.amount(),
                date: Some(e.date()),
                participants: e.splits().iter().map(|s| s.member.clone()).collect(),
                split: SplitMethod::Exact(
                    e.splits()
                        .iter()
                        .map(|s| (s.member.clone(), s.amount))
                        .collect(),
                ),
            })
            .collect(),
        settlements: group
            .settlements()
            .iter()
            .map(|s| SettlementInput {
                from: s.from().clone(),
                to: s.to().clone(),
                amount: s.amount(),
            })
            .collect(),
    };
    let json = to_json(&file);

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("writing to '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses and {} settlements across {} members → {}",
            group.expenses().len(),
            group.settlements().len(),
            group.member_count(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "simplify" => cmd_simplify(rest),
        "summary" => cmd_summary(rest),
        "split" => cmd_split(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
