//! Bundled DDL for the browsable dialogue database.
//!
//! Kept as a list of pre-separated statements so that applying the schema
//! never has to split a script on `;`.

pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS actors (
        id INTEGER PRIMARY KEY,
        name TEXT,
        description TEXT,
        characterShortName TEXT,
        shortDescription TEXT,
        longDescription TEXT,
        color INTEGER,
        articyId TEXT,
        pictures TEXT,
        isFemale INTEGER,
        talkativeness INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY,
        name TEXT,
        description TEXT,
        characterShortName TEXT,
        isCursed INTEGER,
        fixtureBonus TEXT,
        requirement TEXT,
        bonus TEXT,
        thoughtType TEXT,
        isThought INTEGER,
        fixtureDescription TEXT,
        autoequip INTEGER,
        itemType INTEGER,
        conversation TEXT,
        timeLeft REAL,
        isSubstance INTEGER,
        stackName TEXT,
        sound INTEGER,
        isConsumable INTEGER,
        itemGroup INTEGER,
        equipOrb TEXT,
        itemValue INTEGER,
        mediumTextValue TEXT,
        multipleAllowed INTEGER,
        articyId TEXT
    )",
    "CREATE TABLE IF NOT EXISTS variables (
        id INTEGER PRIMARY KEY,
        name TEXT,
        initialvalue TEXT,
        description TEXT
    )",
    "CREATE TABLE IF NOT EXISTS conversations (
        id INTEGER PRIMARY KEY,
        title TEXT,
        articyId TEXT,
        onUse TEXT,
        overrideDialogueCondition TEXT,
        alternateOrbText TEXT,
        checkType TEXT,
        condition TEXT,
        instruction TEXT,
        placement TEXT,
        difficulty TEXT,
        description TEXT,
        actor INTEGER,
        conversant INTEGER,
        displayConditionMain TEXT,
        doneConditionMain TEXT,
        cancelConditionMain TEXT,
        taskReward TEXT,
        taskTimed INTEGER,
        type TEXT NOT NULL DEFAULT 'flow' CHECK (type IN ('flow', 'task', 'orb')),
        totalSubtasks INTEGER NOT NULL DEFAULT 0,
        displayTitle TEXT,
        isHidden INTEGER NOT NULL DEFAULT 0,
        totalEntries INTEGER,
        isDeadEnd INTEGER
    )",
    "CREATE TABLE IF NOT EXISTS dentries (
        id INTEGER NOT NULL,
        conversationid INTEGER NOT NULL,
        title TEXT,
        dialoguetext TEXT,
        articyId TEXT,
        sequence TEXT,
        dialogueEntryType TEXT,
        actor INTEGER,
        conversant INTEGER,
        outputId TEXT,
        inputId TEXT,
        forced INTEGER,
        menuText TEXT,
        flagname TEXT,
        isGroup INTEGER,
        conditionstring TEXT,
        userscript TEXT,
        hasAlts INTEGER NOT NULL DEFAULT 0,
        hasCheck INTEGER NOT NULL DEFAULT 0,
        totalModifiers INTEGER NOT NULL DEFAULT 0,
        displayTitle TEXT,
        PRIMARY KEY (conversationid, id)
    )",
    "CREATE TABLE IF NOT EXISTS dlinks (
        originconversationid INTEGER,
        origindialogueid INTEGER,
        destinationconversationid INTEGER,
        destinationdialogueid INTEGER,
        isConnector INTEGER NOT NULL DEFAULT 0,
        priority INTEGER NOT NULL DEFAULT 2,
        PRIMARY KEY (originconversationid, origindialogueid,
                     destinationconversationid, destinationdialogueid)
    )",
    "CREATE TABLE IF NOT EXISTS subtasks (
        id INTEGER NOT NULL CHECK (id BETWEEN 1 AND 12),
        conversationid INTEGER NOT NULL,
        name TEXT,
        isTimed INTEGER,
        displayCondition TEXT,
        doneCondition TEXT,
        cancelCondition TEXT,
        PRIMARY KEY (conversationid, id)
    )",
    "CREATE TABLE IF NOT EXISTS alternates (
        id INTEGER NOT NULL CHECK (id BETWEEN 1 AND 4),
        conversationid INTEGER NOT NULL,
        dialogueid INTEGER NOT NULL,
        alternateline TEXT,
        condition TEXT,
        replaces TEXT,
        PRIMARY KEY (conversationid, dialogueid, id)
    )",
    "CREATE TABLE IF NOT EXISTS modifiers (
        id INTEGER NOT NULL CHECK (id BETWEEN 1 AND 10),
        conversationid INTEGER NOT NULL,
        dialogueid INTEGER NOT NULL,
        modifier REAL,
        variable TEXT,
        tooltip TEXT,
        PRIMARY KEY (conversationid, dialogueid, id)
    )",
    "CREATE TABLE IF NOT EXISTS checks (
        conversationid INTEGER NOT NULL,
        dialogueid INTEGER NOT NULL,
        checktype TEXT NOT NULL CHECK (checktype IN ('passive', 'white', 'red')),
        skilltype TEXT,
        check_target TEXT,
        difficulty REAL,
        PRIMARY KEY (conversationid, dialogueid, checktype)
    )",
    "CREATE INDEX IF NOT EXISTS idx_dentries_actor ON dentries (actor)",
    "CREATE INDEX IF NOT EXISTS idx_dlinks_destination
        ON dlinks (destinationconversationid, destinationdialogueid)",
];
