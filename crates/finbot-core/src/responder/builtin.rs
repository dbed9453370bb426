//! Builtin response tables.
//!
//! These are loaded once at startup and cached for the lifetime of the application.

use std::sync::OnceLock;

use super::table::{
    FixedReplies, GlossaryEntry, GlossaryTable, KeywordEntry, KeywordTable, ResponseTableSet,
    ScenarioEntry, ScenarioTable,
};

pub const GREETING_REPLY: &str =
    "Hello! I'm your AI financial education assistant. How can I help you learn about money today?";

pub const CLARIFICATION_REPLY: &str = "That's a great question about amounts or timing. The answer depends on your specific situation. Could you provide more details about your income, expenses, or goals?";

pub const DECISION_REPLY: &str = "When deciding on a purchase, consider: 1) Do you need it or just want it? 2) Can you afford it without going into debt? 3) Have you compared prices? 4) Will you still value it in a month?";

pub const FALLBACK_REPLY: &str = "I'm not sure how to help with that specific question. Try asking about saving, budgeting, investing, credit, debt, or specific financial terms. You can also ask me about everyday scenarios like managing allowance or saving for something you want to buy.";

static BUILTIN_TABLES: OnceLock<ResponseTableSet> = OnceLock::new();

pub(crate) fn builtin_replies() -> FixedReplies {
    FixedReplies {
        greeting: GREETING_REPLY.to_string(),
        clarification: CLARIFICATION_REPLY.to_string(),
        decision: DECISION_REPLY.to_string(),
        fallback: FALLBACK_REPLY.to_string(),
    }
}

/// Returns a reference to the builtin table set.
pub fn builtin_tables() -> &'static ResponseTableSet {
    BUILTIN_TABLES.get_or_init(|| ResponseTableSet {
        glossary: glossary(),
        scenarios: scenarios(),
        keywords: keywords(),
        replies: builtin_replies(),
    })
}

fn glossary() -> GlossaryTable {
    GlossaryTable(vec![
        GlossaryEntry::new(
            "interest",
            "Money paid for the use of money lent. When you save money in a bank, they pay you interest. When you borrow money, you pay interest.",
        ),
        GlossaryEntry::new(
            "inflation",
            "The increase in prices over time, which reduces the purchasing power of your money.",
        ),
        GlossaryEntry::new(
            "budget",
            "A plan for how you will spend your money each month, including income, expenses, and savings.",
        ),
        GlossaryEntry::new(
            "credit_score",
            "A number that represents your creditworthiness, based on your credit history. Higher scores mean better loan terms.",
        ),
        GlossaryEntry::new(
            "compound_interest",
            "Interest calculated on both the initial principal and the accumulated interest. This makes your money grow faster over time.",
        ),
        GlossaryEntry::new(
            "diversification",
            "Spreading your investments across different types of assets to reduce risk.",
        ),
        GlossaryEntry::new(
            "liquidity",
            "How quickly an asset can be converted to cash without affecting its value.",
        ),
        GlossaryEntry::new(
            "net_worth",
            "The total value of what you own (assets) minus what you owe (liabilities).",
        ),
        GlossaryEntry::new(
            "emergency_fund",
            "Money saved for unexpected expenses or financial emergencies, typically 3-6 months of living expenses.",
        ),
        GlossaryEntry::new(
            "capital_gain",
            "The profit from selling an asset for more than you paid for it.",
        ),
    ])
}

fn scenarios() -> ScenarioTable {
    ScenarioTable(vec![
        ScenarioEntry::new(
            "school_lunch",
            "For school lunches, try setting a weekly budget. If lunch costs $5/day, that's $25/week. Could you bring lunch from home some days to save money?",
        ),
        ScenarioEntry::new(
            "allowance",
            "With a $20 weekly allowance, try saving $5 (25%), spending $10 on fun, and keeping $5 for unexpected expenses.",
        ),
        ScenarioEntry::new(
            "birthday_money",
            "If you received $100 for your birthday, consider saving 50%, spending 30% on something you want, and using 20% to try a small investment with a parent's help.",
        ),
        ScenarioEntry::new(
            "smartphone",
            "For a new $600 smartphone, you could save $50/month to buy it in a year, or $100/month to get it in 6 months. Is it worth waiting?",
        ),
        ScenarioEntry::new(
            "game_console",
            "To buy a $400 gaming console, try saving 25% of your allowance and earnings. If you get $40/week, saving $10 would get you there in 40 weeks.",
        ),
        ScenarioEntry::new(
            "clothes",
            "For clothes shopping, set a seasonal budget. Maybe $150 for back-to-school? Look for sales and consider thrift stores for unique finds at lower prices.",
        ),
        ScenarioEntry::new(
            "movies",
            "Movie outings can add up. A ticket, snacks, and transportation might cost $25. Consider matinees, bringing your own snacks, or alternating with free activities.",
        ),
        ScenarioEntry::new(
            "college",
            "Even small college savings add up. Saving just $20/month from age 13-18 gives you $1,440 plus interest for books or expenses.",
        ),
    ])
}

fn keywords() -> KeywordTable {
    KeywordTable(vec![
        KeywordEntry::new(
            "save",
            [
                "To save money effectively, try the 50/30/20 rule: 50% for needs, 30% for wants, and 20% for savings.",
                "A good way to save is to open a savings account and automatically deposit a small amount each week.",
                "Try the 24-hour rule: When you want to buy something, wait 24 hours before purchasing. Often you'll realize you don't need it that much.",
            ],
        ),
        KeywordEntry::new(
            "budget",
            [
                "A budget is a plan that shows how you'll spend your money. Start by writing down your income and expenses.",
                "To create a simple budget, follow these steps: 1) Calculate income, 2) List expenses, 3) Categorize them, 4) Set limits for each category.",
                "Apps like 'Mint' or 'YNAB' can help you keep a simple budget and track your spending.",
            ],
        ),
        KeywordEntry::new(
            "allowance",
            [
                "You can manage your allowance by dividing it into three categories: immediate spending, short-term savings, and long-term savings.",
                "Try the 1/3 rule: Spend 1/3, save 1/3 for something you'll buy soon, and save 1/3 for long-term goals.",
                "Keep a simple journal where you note every expense. This will help you understand where your money is going.",
            ],
        ),
        KeywordEntry::new(
            "bank",
            [
                "Banks are institutions that help you keep your money safe and earn interest.",
                "A teen bank account is usually opened with the help of a parent or guardian and has no monthly fees.",
                "Bank cards allow you to make payments without carrying physical cash. There are debit cards that use the money in your account and credit cards that are like a loan.",
            ],
        ),
        KeywordEntry::new(
            "credit",
            [
                "Credit is when you borrow money from a bank or another financial institution and pay it back with interest.",
                "Interest is the extra payment you make when you take out a loan. The higher the interest, the more you'll pay.",
                "It's important to understand that credit should be used carefully and only when truly necessary.",
            ],
        ),
        KeywordEntry::new(
            "invest",
            [
                "Investing means putting money into something with the hope it will grow over time.",
                "Even teens can start investing with the help of a parent or guardian through custodial accounts.",
                "Compound interest is like magic for investors - it's when you earn interest on your interest, making your money grow faster over time.",
            ],
        ),
        KeywordEntry::new(
            "debt",
            [
                "Debt is money that you owe to someone else, usually with interest added.",
                "Good debt can help you build wealth (like education loans), while bad debt is for things that lose value quickly.",
                "Always try to pay more than the minimum payment on any debt to reduce the total interest you'll pay.",
            ],
        ),
        KeywordEntry::new(
            "goal",
            [
                "Financial goals should be SMART: Specific, Measurable, Achievable, Relevant, and Time-bound.",
                "Break big financial goals into smaller milestones to make them less overwhelming.",
                "Write down your financial goals and review them regularly to stay motivated.",
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_initialized() {
        let tables = builtin_tables();
        assert_eq!(tables.glossary.entries().len(), 10);
        assert_eq!(tables.scenarios.entries().len(), 8);
        assert_eq!(tables.keywords.entries().len(), 8);
        assert!(tables.keywords.entries().iter().all(|k| k.candidates.len() == 3));
    }

    #[test]
    fn test_builtin_is_cached() {
        assert!(std::ptr::eq(builtin_tables(), builtin_tables()));
    }
}
